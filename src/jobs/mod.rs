mod scan_inbox;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::payments::PaymentService;

pub use scan_inbox::ScanInbox;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, service: &PaymentService);
}

/// Run `job` forever in its own tokio task, waiting one interval
/// before the first run.
pub fn spawn_periodic_job<J: PeriodicJob>(
    service: Arc<PaymentService>,
    job: J,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(job.interval());
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            job.run_job(&service).await;
        }
    })
}
