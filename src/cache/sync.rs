//! Cross-process convergence over the shared store.
//!
//! Every `set` rewrites the kind's timestamp key and `clear` removes it, so
//! the timestamp doubles as the change signal: a poller that sees a
//! different raw value re-reads the persisted copy and replaces its local
//! cell. Last writer wins - no distributed consistency is attempted.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::cell::CacheCell;
use super::payload::Payload;

/// Background task keeping one cell converged with writes from other
/// processes sharing the store. Stops when dropped.
///
/// The raw timestamp string is the only change signal, so a foreign write
/// landing in the same millisecond as the last observed one is
/// indistinguishable and goes unnoticed until the next write. Acceptable
/// under last-writer-wins for this read-mostly cache.
pub struct SyncWatcher {
  handle: JoinHandle<()>,
}

impl SyncWatcher {
  pub(crate) fn spawn<T: Payload>(cell: Arc<CacheCell<T>>, interval: Duration) -> Self {
    // Baseline is read before the task starts: a write landing between
    // spawn and the first poll is still detected as a change.
    let mut last_seen = cell.raw_timestamp();
    let handle = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      // The first tick fires immediately.
      ticker.tick().await;

      loop {
        ticker.tick().await;
        let current = cell.raw_timestamp();
        if current != last_seen {
          debug!("{} cache changed in store, rehydrating", cell.kind());
          last_seen = current;
          cell.rehydrate();
        }
      }
    });

    Self { handle }
  }
}

impl Drop for SyncWatcher {
  fn drop(&mut self) {
    self.handle.abort();
  }
}
