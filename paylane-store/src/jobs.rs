use async_trait::async_trait;
use chrono::{DateTime, Utc};
use paylane_core::repository::{JobScheduler, StoreError};
use tokio::sync::Mutex;
use tracing::info;

/// A job accepted by the scheduler.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub hook: String,
    pub run_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// Records scheduled jobs instead of dispatching them. Host adapters
/// replace this in production; the test suites inspect it.
#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<ScheduledJob>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs accepted so far, oldest first.
    pub async fn jobs(&self) -> Vec<ScheduledJob> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl JobScheduler for RecordingScheduler {
    async fn schedule(
        &self,
        hook: &str,
        run_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), StoreError> {
        info!(hook = %hook, "job scheduled");
        self.jobs.lock().await.push(ScheduledJob {
            hook: hook.to_string(),
            run_at,
            payload,
        });
        Ok(())
    }
}
