//! Popup closure watcher
//!
//! Cross-window close events are not observable, so the handle is polled on a
//! fixed cadence. The first tick that sees it closed ends the watch and drops
//! the ticker; nothing else can cancel it.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::PopupHandle;

/// Default polling cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll `handle` every `every` until it reports closed.
///
/// The first check happens one interval after the call. Returns the number of
/// ticks taken. There is no timeout: an open window is polled indefinitely.
pub async fn wait_for_close(handle: &dyn PopupHandle, every: Duration) -> u64 {
    let mut ticker = time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks = 0u64;
    loop {
        ticker.tick().await;
        ticks += 1;
        if handle.is_closed() {
            tracing::debug!("Popup closed after {} poll(s)", ticks);
            return ticks;
        }
    }
}
