use std::time::Duration;
use tokio::time::{Instant, interval};

use crate::capture::worker;
use crate::common::AppState;
use crate::store::settings::SettingName;

/// Run the periodic reading capture task.
///
/// The capture cadence is the `reading_interval` setting, re-read on every
/// tick so a settings update re-paces the task without a restart. An interval
/// of zero or less pauses capture entirely.
pub async fn run_reading_capture(state: AppState) {
    let tick_secs = state.config.scheduler_tick_seconds.max(1);
    tracing::info!(tick_secs, "Starting reading capture scheduler");

    let mut ticker = interval(Duration::from_secs(tick_secs));
    let mut last_capture: Option<Instant> = None;

    loop {
        ticker.tick().await;

        let interval_secs = {
            let settings = state.settings.read().await;
            settings.get(SettingName::ReadingInterval).as_i64()
        };
        if interval_secs <= 0 {
            continue;
        }

        #[allow(clippy::cast_sign_loss)]
        let cadence = Duration::from_secs(interval_secs as u64);
        let due = last_capture.is_none_or(|at| at.elapsed() >= cadence);
        if !due {
            continue;
        }

        // Mark the attempt regardless of outcome so a persistent failure
        // retries at the capture cadence, not the tick rate.
        last_capture = Some(Instant::now());

        match worker::capture_reading(&state, true).await {
            Ok(sample) => {
                tracing::debug!(ts = ?sample.ts, "Scheduled reading captured");
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled reading capture failed");
            }
        }
    }
}
