//! Daily price check job
//!
//! Runs the batch price check once a day at a fixed local hour and appends
//! a price-history record for every item whose page yielded a price.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use tokio::time::sleep;

use crate::services::price_check;
use crate::AppState;

pub async fn start_price_check_job(state: AppState, hour: u32) {
    tokio::spawn(async move {
        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, hour);
            let wait = (next - now).to_std().unwrap_or_default();

            tracing::info!("Next scheduled price check at {}", next);
            sleep(wait).await;

            tracing::info!("Running scheduled price check...");
            match price_check::check_all(state.store.as_ref(), &state.extractor).await {
                Ok(results) => {
                    for result in results.iter().filter(|r| r.error.is_some()) {
                        tracing::warn!(
                            "Price check for {} (item {}) failed: {}",
                            result.name,
                            result.item_id,
                            result.error.as_deref().unwrap_or_default()
                        );
                    }
                    tracing::info!("Scheduled price check complete ({} items)", results.len());
                }
                Err(e) => {
                    tracing::error!("Scheduled price check failed: {}", e);
                }
            }
        }
    });
}

/// The first `hour:00` strictly after `now`
pub fn next_run_after(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
