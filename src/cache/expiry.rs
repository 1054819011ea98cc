//! Time-to-live policy over the per-kind timestamp key.

use chrono::Duration;

use super::clock::Clock;
use super::store::PersistentStore;

/// Decides whether a resource kind's persisted content is stale.
///
/// The timestamp is shared per resource kind, not per locale: a write to any
/// locale resets the one staleness clock for that kind.
pub struct ExpiryPolicy {
  kind: &'static str,
  ttl: Duration,
}

impl ExpiryPolicy {
  /// Default time-to-live for cached content.
  pub const DEFAULT_TTL_SECONDS: i64 = 5 * 60;

  pub fn new(kind: &'static str) -> Self {
    Self {
      kind,
      ttl: Duration::seconds(Self::DEFAULT_TTL_SECONDS),
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// The durable key holding the epoch-millis string of the last write.
  pub fn timestamp_key(&self) -> String {
    format!("{}-timestamp", self.kind)
  }

  /// Whether the persisted copy is past its time-to-live.
  ///
  /// A missing or unparseable timestamp is always expired - failing toward a
  /// refetch rather than serving indefinitely stale content.
  pub fn is_expired(&self, store: &dyn PersistentStore, clock: &dyn Clock) -> bool {
    let written = match store.read(&self.timestamp_key()) {
      Some(raw) => match raw.trim().parse::<i64>() {
        Ok(millis) => millis,
        Err(_) => return true,
      },
      None => return true,
    };

    clock.now_millis() - written > self.ttl.num_milliseconds()
  }
}
