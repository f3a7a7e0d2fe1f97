use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::{
    app::{
        self,
        config::{AppConfig, DatabaseSettings, StorageSettings},
        state::AppState,
    },
    auth::jwt::JwtConfig,
    error::AppError,
    telemetry,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing()
        .map_err(|err| AppError::Internal(format!("telemetry init failed: {}", err)))?;

    let result = serve(AppConfig::from_env()?).await;
    telemetry::shutdown_tracing();
    result
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    let jwt_config = JwtConfig::from_env(config.jwt_secret.clone());
    let state = match &config.storage {
        StorageSettings::Postgres(settings) => {
            AppState::with_postgres(connect(settings).await?, jwt_config)
        }
        StorageSettings::Memory { complaint_ids } => {
            tracing::warn!(
                complaints = complaint_ids.len(),
                "Using in-memory comment storage; data is lost on restart"
            );
            AppState::in_memory(complaint_ids.clone(), jwt_config)
        }
    };

    let cors = app::router::cors_layer(&config.cors_origin)?;
    let app = app::router::build_router(state, cors);

    tracing::info!(addr = %config.addr, "Server listening");
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|err| AppError::Internal(format!("bind failed: {}", err)))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {}", err)))
}

async fn connect(settings: &DatabaseSettings) -> Result<sqlx::PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.url)
        .await
        .map_err(AppError::Database)?;

    if settings.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
