//! Fetch orchestration and the public per-resource cache surface.

use chrono::Duration;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::error::CacheError;
use crate::locale::{Locale, LocaleMap};

use super::broadcast::Subscription;
use super::cell::CacheCell;
use super::clock::{Clock, SystemClock};
use super::payload::Payload;
use super::store::PersistentStore;
use super::sync::SyncWatcher;

/// Shared handle to one resource kind's cache.
///
/// Cheap to clone; every clone observes and mutates the same cell, so any
/// number of consumers can hold one and stay in sync through
/// [`CacheManager::subscribe`].
pub struct CacheManager<T: Payload> {
  cell: Arc<CacheCell<T>>,
}

impl<T: Payload> CacheManager<T> {
  /// Create a manager for a resource kind over the given store, with the
  /// default 5 minute time-to-live and the system clock.
  pub fn new(kind: &'static str, store: Arc<dyn PersistentStore>) -> Self {
    Self {
      cell: Arc::new(CacheCell::new(kind, store, Arc::new(SystemClock))),
    }
  }

  /// Set the time-to-live for this kind. Builder-time only (before the
  /// manager is cloned or used).
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    if let Some(cell) = Arc::get_mut(&mut self.cell) {
      cell.set_ttl(ttl);
    }
    self
  }

  /// Swap the clock. Builder-time only.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    if let Some(cell) = Arc::get_mut(&mut self.cell) {
      cell.set_clock(clock);
    }
    self
  }

  pub fn kind(&self) -> &'static str {
    self.cell.kind()
  }

  /// Snapshot of the full locale map.
  pub fn state(&self) -> LocaleMap<T> {
    self.cell.get()
  }

  /// Snapshot of one locale's slice.
  pub fn get_by_locale(&self, locale: Locale) -> T {
    self.cell.get().get(locale).clone()
  }

  /// Make sure `locale` has data, fetching at most once.
  ///
  /// The `force` polarity reads backwards: `force = true` (the conventional
  /// default) lets a fresh, non-empty cached slice short-circuit the fetch -
  /// at most one fetch per locale per TTL window no matter how many
  /// consumers call this. `force = false` means "always refetch".
  ///
  /// On fetch failure the cache is left untouched and the error is returned;
  /// a later call may retry. There is no in-flight mutex: two concurrent
  /// first loads of the same empty locale may both fetch, and the later
  /// response wins through the ordinary merge path.
  pub async fn ensure<F, Fut>(&self, locale: Locale, force: bool, fetcher: F) -> Result<(), CacheError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CacheError>>,
  {
    if force && !self.cell.is_expired() && !self.get_by_locale(locale).is_empty() {
      return Ok(());
    }

    match fetcher().await {
      Ok(incoming) => {
        self.cell.merge_locale(locale, incoming);
        Ok(())
      }
      Err(e) => {
        warn!("{} fetch for {} failed: {}", self.kind(), locale, e);
        Err(e)
      }
    }
  }

  /// Seed several locales at once without a network round trip
  /// (e.g. from server-rendered props). Merge semantics apply.
  pub fn update(&self, entries: impl IntoIterator<Item = (Locale, T)>) {
    self.cell.set(|map| {
      for (locale, value) in entries {
        map.get_mut(locale).merge(value);
      }
    });
  }

  /// Seed a single locale without a network round trip.
  pub fn update_by_locale(&self, locale: Locale, value: T) {
    self.cell.merge_locale(locale, value);
  }

  /// Empty this kind's cache, in memory and in the store.
  pub fn clear(&self) {
    self.cell.clear();
  }

  /// Whether the kind's cached content is past its time-to-live.
  pub fn is_expired(&self) -> bool {
    self.cell.is_expired()
  }

  /// Register a listener called after every mutation.
  pub fn subscribe<F: Fn() + Send + Sync + 'static>(&self, listener: F) -> Subscription {
    self.cell.subscribe(listener)
  }

  /// Start polling the store for writes made by other processes.
  /// See [`SyncWatcher`].
  pub fn watch(&self, interval: std::time::Duration) -> SyncWatcher {
    SyncWatcher::spawn(Arc::clone(&self.cell), interval)
  }
}

impl<T: Payload> Clone for CacheManager<T> {
  fn clone(&self) -> Self {
    Self {
      cell: Arc::clone(&self.cell),
    }
  }
}
