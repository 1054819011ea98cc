//! Listener fan-out for cache mutations.
//!
//! Every consumer of a resource kind subscribes once and gets one callback
//! per `set`/`clear`, letting independent views re-render in sync without
//! threading state through them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener = Arc<dyn Fn() + Send + Sync + 'static>;
type ListenerSet = Mutex<Vec<(u64, Listener)>>;

/// Registry of mutation listeners for one cache cell.
pub struct Broadcaster {
  listeners: Arc<ListenerSet>,
  next_id: AtomicU64,
}

impl Broadcaster {
  pub fn new() -> Self {
    Self {
      listeners: Arc::new(Mutex::new(Vec::new())),
      next_id: AtomicU64::new(0),
    }
  }

  /// Register a listener. Dropping the returned subscription (or calling
  /// `unsubscribe`) removes it; a removed listener receives no further
  /// notifications.
  pub fn subscribe<F: Fn() + Send + Sync + 'static>(&self, listener: F) -> Subscription {
    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut listeners) = self.listeners.lock() {
      listeners.push((id, Arc::new(listener)));
    }
    Subscription {
      id,
      listeners: Arc::downgrade(&self.listeners),
    }
  }

  /// Call every currently-subscribed listener exactly once.
  ///
  /// The set is snapshotted before iterating, so a listener that subscribes
  /// or unsubscribes mid-notify never causes a skip or a double call.
  pub fn notify(&self) {
    let snapshot: Vec<Listener> = match self.listeners.lock() {
      Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
      Err(_) => return,
    };

    for listener in snapshot {
      listener();
    }
  }

  #[cfg(test)]
  pub fn listener_count(&self) -> usize {
    self.listeners.lock().map(|l| l.len()).unwrap_or(0)
  }
}

impl Default for Broadcaster {
  fn default() -> Self {
    Self::new()
  }
}

/// Handle keeping one listener registered. Unsubscribes on drop.
pub struct Subscription {
  id: u64,
  listeners: Weak<ListenerSet>,
}

impl Subscription {
  /// Remove the listener now instead of waiting for drop.
  pub fn unsubscribe(self) {
    // Drop does the work.
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(listeners) = self.listeners.upgrade() {
      if let Ok(mut listeners) = listeners.lock() {
        listeners.retain(|(id, _)| *id != self.id);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::AtomicUsize;

  #[test]
  fn test_each_listener_notified_once_per_notify() {
    let broadcaster = Broadcaster::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let first_count = Arc::clone(&first);
    let _sub_a = broadcaster.subscribe(move || {
      first_count.fetch_add(1, Ordering::SeqCst);
    });
    let second_count = Arc::clone(&second);
    let _sub_b = broadcaster.subscribe(move || {
      second_count.fetch_add(1, Ordering::SeqCst);
    });

    broadcaster.notify();
    broadcaster.notify();

    assert_eq!(first.load(Ordering::SeqCst), 2);
    assert_eq!(second.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_unsubscribed_listener_receives_nothing() {
    let broadcaster = Broadcaster::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&calls);
    let sub = broadcaster.subscribe(move || {
      count.fetch_add(1, Ordering::SeqCst);
    });

    broadcaster.notify();
    sub.unsubscribe();
    broadcaster.notify();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(broadcaster.listener_count(), 0);
  }

  #[test]
  fn test_drop_removes_listener() {
    let broadcaster = Broadcaster::new();
    {
      let _sub = broadcaster.subscribe(|| {});
      assert_eq!(broadcaster.listener_count(), 1);
    }
    assert_eq!(broadcaster.listener_count(), 0);
  }
}
