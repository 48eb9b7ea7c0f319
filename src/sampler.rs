//! Background sampler: one probe per interval, fanned out to every viewer
//! and into the active monitoring sessions.

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::warn;

use crate::metrics::{collect_snapshot, now_ms};
use crate::state::AppState;

/// Spawn the sampling loop. Ticks are strictly sequential: a probe slower
/// than the interval delays the next tick instead of overlapping it.
pub fn spawn_sampler(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(state.config.update_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match collect_snapshot(&state).await {
                Ok(snapshot) => {
                    *state.latest.write().await = Some(snapshot.clone());
                    state.sessions.lock().await.on_snapshot(&snapshot, now_ms());
                }
                Err(e) => {
                    // Non-fatal: report this tick and try again on the next.
                    warn!("probe failed: {e}");
                    state.sessions.lock().await.on_probe_error(&e.to_string());
                }
            }
        }
    })
}
