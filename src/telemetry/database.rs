use std::time::Instant;

use tracing::{Instrument, debug, info_span, warn};

/// Runs a store query inside a `db_query` span and records its latency.
pub async fn log_query<F, T, E, R>(
    query_name: &'static str,
    query: F,
    row_counter: R,
) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    R: Fn(&T) -> u64,
{
    let span = info_span!("db_query", query = %query_name);
    let start = Instant::now();
    let result = query.instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis();

    span.in_scope(|| match &result {
        Ok(value) => debug!(latency_ms = %latency_ms, rows = %row_counter(value), "Query finished"),
        Err(error) => warn!(latency_ms = %latency_ms, error = ?error, "Query failed"),
    });

    result
}

#[macro_export]
macro_rules! log_query_execute {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |result| result.rows_affected())
            .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_all {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |rows| rows.len() as u64).await
    };
}

#[macro_export]
macro_rules! log_query_fetch_optional {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |row| u64::from(row.is_some()))
            .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_one {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |_| 1).await
    };
}
