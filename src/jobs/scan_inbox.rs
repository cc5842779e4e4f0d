use async_trait::async_trait;
use std::time::Duration;

use super::PeriodicJob;
use crate::payments::PaymentService;

/// Rescans the inbox so evidence keeps growing without anyone calling
/// the scan endpoint
#[derive(Debug)]
pub struct ScanInbox {
    pub every: Duration,
}

#[async_trait]
impl PeriodicJob for ScanInbox {
    fn interval(&self) -> Duration {
        self.every
    }

    async fn run_job(&self, service: &PaymentService) {
        match service.run_scan().await {
            Ok(report) => tracing::debug!(
                "Background scan found {} new payments ({} total)",
                report.outcome.inserted,
                report.payments.len()
            ),
            Err(e) => tracing::error!("Background scan failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::jobs::spawn_periodic_job;
    use crate::payments::ScanSettings;
    use crate::payments::service::tests::{SharedInbox, StaticAuthorizer};

    #[tokio::test(start_paused = true)]
    async fn it_collects_evidence_on_each_tick() {
        let inbox = Arc::new(SharedInbox::default());
        let service = Arc::new(PaymentService::new(
            Arc::new(StaticAuthorizer::granting(inbox.clone())),
            ScanSettings::default(),
        ));
        let handle = spawn_periodic_job(
            service.clone(),
            ScanInbox {
                every: Duration::from_secs(60),
            },
        );

        inbox.deliver("m1", "Rs 10 paid via UPI", "1700000000000");
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(service.admin_snapshot().payments.len(), 1);

        inbox.deliver("m2", "Rs 20 received by card", "1700000001000");
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.admin_snapshot().payments.len(), 2);

        handle.abort();
    }
}
