//! Prometheus metrics for the API
//!
//! Recording goes through the `metrics` facade; when no recorder is
//! installed (tests, `migrate`, `sanitize`) every call is a no-op.

use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// All metric names used in the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    GraphqlRequests,
    GraphqlErrors,
    GraphqlDuration,
    LegalDocumentsCreated,
    StorageQueries,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::GraphqlRequests => "collectives_graphql_requests_total",
            MetricName::GraphqlErrors => "collectives_graphql_errors_total",
            MetricName::GraphqlDuration => "collectives_graphql_duration_seconds",
            MetricName::LegalDocumentsCreated => "collectives_legal_documents_created_total",
            MetricName::StorageQueries => "collectives_storage_queries_total",
        }
    }
}

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Render the current metrics in Prometheus text format
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod graphql {
    use super::MetricName;

    pub fn request(operation: &str, secs: f64) {
        metrics::counter!(MetricName::GraphqlRequests.as_str(), "operation" => operation.to_string())
            .increment(1);
        metrics::histogram!(MetricName::GraphqlDuration.as_str()).record(secs);
    }

    pub fn errors(count: usize) {
        if count > 0 {
            metrics::counter!(MetricName::GraphqlErrors.as_str()).increment(count as u64);
        }
    }
}

pub mod storage {
    use super::MetricName;

    pub fn query(table: &'static str) {
        metrics::counter!(MetricName::StorageQueries.as_str(), "table" => table).increment(1);
    }

    pub fn legal_document_created() {
        metrics::counter!(MetricName::LegalDocumentsCreated.as_str()).increment(1);
    }
}
