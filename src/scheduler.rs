use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeZone};

use crate::reconciler::Reconciler;

/// Duration until the next local occurrence of `hour`:00:00.
///
/// DST gaps and folds collapse to the earliest valid interpretation; if the
/// target hour does not exist on a given day the wait falls back to 24 hours.
pub fn time_until_next_reset(now: DateTime<Local>, hour: u32) -> Duration {
    let target = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let mut candidate = now.date_naive().and_time(target);
    if Local
        .from_local_datetime(&candidate)
        .earliest()
        .map_or(true, |dt| dt <= now)
    {
        candidate += chrono::Duration::days(1);
    }
    match Local.from_local_datetime(&candidate).earliest() {
        Some(next) => (next - now)
            .to_std()
            .unwrap_or(Duration::from_secs(24 * 60 * 60)),
        None => Duration::from_secs(24 * 60 * 60),
    }
}

/// Runs forever, clearing every office's open slots once a day at the
/// configured local hour. The sweep is best-effort; a failed run is logged and
/// retried at the next boundary.
pub async fn run_reset_worker(reconciler: Arc<Reconciler>, hour: u32) {
    loop {
        let wait = time_until_next_reset(Local::now(), hour);
        tracing::info!("Next availability reset in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;
        if let Err(e) = reconciler.reset_all_availability().await {
            tracing::error!("Daily availability reset failed: {e:?}");
        }
    }
}
