//! The per-resource-kind shared cache state.
//!
//! One `CacheCell` is the single source of truth for a resource kind within
//! a process. It hydrates lazily from the persistent store, persists every
//! mutation together with the kind's shared timestamp, and fans out a
//! notification after each change.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::locale::{Locale, LocaleMap};

use super::broadcast::{Broadcaster, Subscription};
use super::clock::Clock;
use super::expiry::ExpiryPolicy;
use super::payload::Payload;
use super::store::PersistentStore;

/// Bumped whenever the persisted payload shape changes. A mismatch discards
/// the persisted copy the same way an expiry would - no migration path.
const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct PersistedEntryRef<'a, T> {
  version: u32,
  payload: &'a LocaleMap<T>,
}

#[derive(Deserialize)]
#[serde(bound = "T: Payload")]
struct PersistedEntry<T> {
  version: u32,
  payload: LocaleMap<T>,
}

/// Process-wide mutable record mapping locale -> payload for one resource
/// kind. All mutations persist, restamp, and notify together; when
/// persistence fails the in-memory value still updates and stays
/// authoritative for the process.
pub struct CacheCell<T: Payload> {
  kind: &'static str,
  store: Arc<dyn PersistentStore>,
  clock: Arc<dyn Clock>,
  expiry: ExpiryPolicy,
  // None until first hydration attempt.
  state: Mutex<Option<LocaleMap<T>>>,
  broadcaster: Broadcaster,
}

impl<T: Payload> CacheCell<T> {
  pub fn new(kind: &'static str, store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
    Self {
      kind,
      store,
      clock,
      expiry: ExpiryPolicy::new(kind),
      state: Mutex::new(None),
      broadcaster: Broadcaster::new(),
    }
  }

  pub fn kind(&self) -> &'static str {
    self.kind
  }

  /// Builder-time only: adjust the time-to-live.
  pub(crate) fn set_ttl(&mut self, ttl: Duration) {
    self.expiry = ExpiryPolicy::new(self.kind).with_ttl(ttl);
  }

  /// Builder-time only: swap the clock.
  pub(crate) fn set_clock(&mut self, clock: Arc<dyn Clock>) {
    self.clock = clock;
  }

  fn value_key(&self) -> String {
    format!("{}-value", self.kind)
  }

  /// Whether the kind's persisted timestamp is past its time-to-live.
  pub fn is_expired(&self) -> bool {
    self.expiry.is_expired(self.store.as_ref(), self.clock.as_ref())
  }

  /// Raw timestamp value, used by the cross-process watcher as its change
  /// signal (every write rewrites it, `clear` removes it).
  pub fn raw_timestamp(&self) -> Option<String> {
    self.store.read(&self.expiry.timestamp_key())
  }

  /// Read the persisted copy, discarding it on parse failure or schema
  /// version mismatch.
  fn read_persisted(&self) -> Option<LocaleMap<T>> {
    let raw = self.store.read(&self.value_key())?;
    match serde_json::from_str::<PersistedEntry<T>>(&raw) {
      Ok(entry) if entry.version == SCHEMA_VERSION => Some(entry.payload),
      Ok(entry) => {
        debug!(
          "discarding persisted {} cache: schema version {} != {}",
          self.kind, entry.version, SCHEMA_VERSION
        );
        None
      }
      Err(e) => {
        warn!("discarding unreadable persisted {} cache: {}", self.kind, e);
        None
      }
    }
  }

  fn hydrate(&self, state: &mut MutexGuard<'_, Option<LocaleMap<T>>>) {
    if state.is_some() {
      return;
    }
    let hydrated = if self.is_expired() {
      // Expired (or never written): the persisted copy is not worth loading.
      None
    } else {
      self.read_persisted()
    };
    **state = Some(hydrated.unwrap_or_default());
  }

  /// Current in-memory state, hydrating from the store on first use.
  pub fn get(&self) -> LocaleMap<T> {
    let mut state = self.lock_state();
    self.hydrate(&mut state);
    state.as_ref().cloned().unwrap_or_default()
  }

  /// Functional update: apply `updater` to the current map, persist the
  /// result, refresh the shared timestamp, notify subscribers.
  pub fn set<F: FnOnce(&mut LocaleMap<T>)>(&self, updater: F) {
    {
      let mut state = self.lock_state();
      self.hydrate(&mut state);
      let map = state.get_or_insert_with(LocaleMap::new);
      updater(map);
      self.persist(map);
    }
    self.broadcaster.notify();
  }

  /// Merge a freshly fetched slice into one locale (upsert for lists,
  /// replace for scalars).
  pub fn merge_locale(&self, locale: Locale, incoming: T) {
    self.set(|map| map.get_mut(locale).merge(incoming));
  }

  /// Reset to the all-locales-default map and drop the persisted copy.
  /// No fresh timestamp is written.
  pub fn clear(&self) {
    {
      let mut state = self.lock_state();
      *state = Some(LocaleMap::new());
      self.store.remove(&self.value_key());
      self.store.remove(&self.expiry.timestamp_key());
    }
    self.broadcaster.notify();
  }

  /// Replace the in-memory state with whatever the store holds right now.
  ///
  /// This is the receiving side of cross-process sync: last writer wins, a
  /// removed persisted copy resets to defaults. Does not touch the
  /// timestamp.
  pub fn rehydrate(&self) {
    let fresh = self.read_persisted().unwrap_or_default();
    {
      let mut state = self.lock_state();
      *state = Some(fresh);
    }
    self.broadcaster.notify();
  }

  pub fn subscribe<F: Fn() + Send + Sync + 'static>(&self, listener: F) -> Subscription {
    self.broadcaster.subscribe(listener)
  }

  fn persist(&self, map: &LocaleMap<T>) {
    let entry = PersistedEntryRef {
      version: SCHEMA_VERSION,
      payload: map,
    };
    match serde_json::to_string(&entry) {
      Ok(json) => {
        self.store.write(&self.value_key(), &json);
        self
          .store
          .write(&self.expiry.timestamp_key(), &self.clock.now_millis().to_string());
      }
      Err(e) => {
        // In-memory state stays authoritative; the persisted copy just
        // falls behind until the next successful write.
        warn!("failed to serialize {} cache for persistence: {}", self.kind, e);
      }
    }
  }

  fn lock_state(&self) -> MutexGuard<'_, Option<LocaleMap<T>>> {
    match self.state.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::clock::ManualClock;
  use crate::cache::store::MemoryStore;

  fn cell_with(
    store: Arc<dyn PersistentStore>,
    clock: Arc<ManualClock>,
  ) -> CacheCell<Vec<String>> {
    let clock: Arc<dyn Clock> = clock;
    CacheCell::new("game-list", store, clock)
  }

  #[test]
  fn test_get_is_idempotent() {
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let cell = cell_with(store, clock);

    cell.set(|map| map.get_mut(Locale::En).push("a".to_string()));

    let first = cell.get();
    let second = cell.get();
    assert_eq!(first, second);
  }

  #[test]
  fn test_hydrates_unexpired_persisted_copy() {
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));

    let writer = cell_with(Arc::clone(&store), Arc::clone(&clock));
    writer.set(|map| map.get_mut(Locale::Zh).push("x".to_string()));

    // Fresh cell over the same store, within the TTL window.
    let reader = cell_with(store, clock);
    assert_eq!(reader.get().get(Locale::Zh), &vec!["x".to_string()]);
  }

  #[test]
  fn test_discards_expired_persisted_copy() {
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));

    let writer = cell_with(Arc::clone(&store), Arc::clone(&clock));
    writer.set(|map| map.get_mut(Locale::Zh).push("x".to_string()));

    clock.advance_millis(6 * 60 * 1000);
    let reader = cell_with(store, clock);
    assert!(reader.get().get(Locale::Zh).is_empty());
  }

  #[test]
  fn test_discards_version_mismatch() {
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    store.write("game-list-value", r#"{"version":99,"payload":{"en":["old"]}}"#);
    store.write("game-list-timestamp", "0");

    let cell = cell_with(store, clock);
    assert!(cell.get().get(Locale::En).is_empty());
  }

  #[test]
  fn test_clear_resets_memory_and_store() {
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let cell = cell_with(Arc::clone(&store), clock);

    cell.set(|map| map.get_mut(Locale::En).push("a".to_string()));
    cell.clear();

    assert!(cell.get().get(Locale::En).is_empty());
    assert_eq!(store.read("game-list-value"), None);
    assert_eq!(store.read("game-list-timestamp"), None);
  }

  #[test]
  fn test_set_notifies_subscribers() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let cell = cell_with(store, clock);

    let calls = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&calls);
    let _sub = cell.subscribe(move || {
      count.fetch_add(1, Ordering::SeqCst);
    });

    cell.set(|map| map.get_mut(Locale::En).push("a".to_string()));
    cell.clear();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_noop_store_keeps_memory_authoritative() {
    use crate::cache::store::NoopStore;

    let store: Arc<dyn PersistentStore> = Arc::new(NoopStore);
    let clock = Arc::new(ManualClock::new(0));
    let cell = cell_with(store, clock);

    cell.set(|map| map.get_mut(Locale::En).push("a".to_string()));
    assert_eq!(cell.get().get(Locale::En), &vec!["a".to_string()]);
  }
}
