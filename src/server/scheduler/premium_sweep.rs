use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{error::AppError, service::reconciler::EntitlementReconciler};

/// Cron expression for the premium sweep: second 0 of every minute.
const SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Starts the premium sweep scheduler
///
/// Every minute the shared update file is reconciled against the entitlement store. A pass
/// that is still running when the next tick fires makes that tick wait on the reconciler's
/// batch lock rather than run concurrently.
///
/// # Arguments
/// - `reconciler`: Reconciler shared with the payment webhook
///
/// # Returns
/// - `Ok(JobScheduler)` - Running scheduler; call `shutdown` on it to stop new passes
/// - `Err(AppError::SchedulerErr)` - Scheduler could not be created or started
pub async fn start_scheduler(
    reconciler: Arc<EntitlementReconciler>,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
        let reconciler = reconciler.clone();

        Box::pin(async move {
            if let Err(e) = reconciler.sweep().await {
                tracing::error!("Error writing back premium updates: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Premium sweep scheduler started");

    Ok(scheduler)
}
