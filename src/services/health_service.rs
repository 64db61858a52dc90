use crate::services::user_store::UserStore;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const STORE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
struct Metrics {
    status: Gauge<i64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("exercise-tracker");
        Self {
            status: meter
                .i64_gauge("exercise_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Arc<dyn UserStore>,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store, metrics: Metrics::new() }
    }

    /// Checks record store connectivity.
    ///
    /// # Errors
    /// Returns a string describing the failure if the store is unreachable.
    pub async fn check_store(&self) -> Result<(), String> {
        let result = match timeout(STORE_TIMEOUT, self.store.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Store connection failed: {e}")),
            Err(_) => Err("Store connection timed out".to_string()),
        };

        let status = i64::from(result.is_ok());
        self.metrics.status.record(status, &[KeyValue::new("component", "store")]);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryUserStore;
    use crate::config::DefaultDatePolicy;

    #[tokio::test]
    async fn test_memory_store_is_always_ready() {
        let service = HealthService::new(Arc::new(MemoryUserStore::new(DefaultDatePolicy::Now)));
        assert!(service.check_store().await.is_ok());
    }
}
