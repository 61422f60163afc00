//! Due-request sweep
//!
//! Requests that are not done and whose effective date has arrived are
//! processed one by one. A failing request is logged and counted; the
//! sweep carries on with the next one.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::tasks::BackgroundTasks;
use crate::lifecycle::{Lifecycle, LifecycleError};
use crate::store::StoreResult;
use crate::utils::time::today;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub processed: usize,
    pub failed: usize,
}

impl Lifecycle {
    /// Process every request due on `today`
    pub async fn sweep_due(&self, today: NaiveDate) -> StoreResult<SweepReport> {
        let due = self.store().due_requests(today)?;
        let mut report = SweepReport::default();

        for request in due {
            match self.process(request.id, today).await {
                Ok(_) => report.processed += 1,
                // processed interactively since the listing
                Err(LifecycleError::AlreadyProcessed(_)) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(target: "scheduler", request_id = request.id, error = %e, "Due request failed");
                }
            }
        }

        if report.processed > 0 || report.failed > 0 {
            tracing::info!(
                target: "scheduler",
                processed = report.processed,
                failed = report.failed,
                "Due sweep finished"
            );
        }
        Ok(report)
    }
}

/// Register the periodic sweep
pub fn register(tasks: &mut BackgroundTasks, lifecycle: Lifecycle, interval: Duration) {
    tracing::info!(target: "scheduler", interval_secs = interval.as_secs(), "Due sweep scheduled");
    tasks.spawn_periodic("due_sweep", interval, move || {
        let lifecycle = lifecycle.clone();
        async move {
            if let Err(e) = lifecycle.sweep_due(today()).await {
                tracing::error!(target: "scheduler", error = %e, "Due sweep could not list requests");
            }
        }
    });
}
