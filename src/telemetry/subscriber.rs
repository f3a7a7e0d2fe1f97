use std::{env, error::Error, sync::OnceLock};

use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    trace::{Sampler, SdkTracerProvider, Tracer},
};
use tracing::Level;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

const SERVICE_NAME: &str = "fiscaliza-comments";

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: Level,
    pub export: Option<TraceExport>,
}

/// Where spans go when an OTLP collector is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceExport {
    pub endpoint: String,
    pub service_name: String,
    pub sample_ratio: f64,
}

impl TraceExport {
    fn parse(
        endpoint: Option<&str>,
        service_name: Option<&str>,
        ratio: Option<&str>,
    ) -> Option<Self> {
        let endpoint = endpoint.map(str::trim).filter(|value| !value.is_empty())?;
        let service_name = service_name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(SERVICE_NAME);
        let sample_ratio = ratio
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| (0.0..=1.0).contains(value))
            .unwrap_or(1.0);

        Some(Self {
            endpoint: endpoint.to_string(),
            service_name: service_name.to_string(),
            sample_ratio,
        })
    }

    fn build_layer(
        &self,
    ) -> Result<OpenTelemetryLayer<Registry, Tracer>, Box<dyn Error + Send + Sync>> {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let resource = Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
            .build();

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.clone())
            .build()?;

        let provider = SdkTracerProvider::builder()
            .with_resource(resource)
            .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
                self.sample_ratio,
            ))))
            .with_batch_exporter(exporter)
            .build();

        let tracer = provider.tracer(SERVICE_NAME);
        let _ = TRACER_PROVIDER.set(provider.clone());
        global::set_tracer_provider(provider);

        Ok(OpenTelemetryLayer::new(tracer))
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::parse(
            env::var("LOG_FORMAT").ok().as_deref(),
            env::var("LOG_LEVEL").ok().as_deref(),
        );
        settings.export = TraceExport::parse(
            env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok().as_deref(),
            env::var("OTEL_SERVICE_NAME").ok().as_deref(),
            env::var("OTEL_TRACES_SAMPLER_ARG").ok().as_deref(),
        );
        settings
    }

    fn parse(format: Option<&str>, level: Option<&str>) -> Self {
        let format = match format {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let level = match level {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ => Level::INFO,
        };

        Self {
            format,
            level,
            export: None,
        }
    }

    fn default_filter(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        format!("{level},tower_http=info,sqlx=warn")
    }
}

pub fn init_tracing() -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = LogSettings::from_env();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_filter()));

    let fmt_layer = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
    };

    let otel_layer = settings
        .export
        .as_ref()
        .map(TraceExport::build_layer)
        .transpose()?;

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flushes pending spans when export is enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            tracing::warn!("OpenTelemetry tracer shutdown failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_info() {
        let settings = LogSettings::parse(None, None);
        assert_eq!(settings.format, LogFormat::Pretty);
        assert_eq!(settings.level, Level::INFO);
        assert_eq!(settings.default_filter(), "info,tower_http=info,sqlx=warn");
    }

    #[test]
    fn reads_json_format_and_level() {
        let settings = LogSettings::parse(Some("json"), Some("debug"));
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.level, Level::DEBUG);
    }

    #[test]
    fn trace_export_needs_an_endpoint() {
        assert_eq!(TraceExport::parse(None, Some("svc"), Some("0.5")), None);
        assert_eq!(TraceExport::parse(Some("  "), None, None), None);
    }

    #[test]
    fn trace_export_defaults_and_clamps_ratio() {
        let export = TraceExport::parse(Some("http://collector:4317"), None, Some("7")).unwrap();
        assert_eq!(export.endpoint, "http://collector:4317");
        assert_eq!(export.service_name, SERVICE_NAME);
        assert_eq!(export.sample_ratio, 1.0);

        let export =
            TraceExport::parse(Some("http://collector:4317"), Some("comments-eu"), Some("0.25"))
                .unwrap();
        assert_eq!(export.service_name, "comments-eu");
        assert_eq!(export.sample_ratio, 0.25);
    }
}
