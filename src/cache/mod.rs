//! Generic locale-keyed cache, instantiated once per resource kind.
//!
//! This module provides a content-agnostic caching mechanism that:
//! - Keeps one in-memory `LocaleMap` per resource kind as the process-wide
//!   source of truth
//! - Persists every mutation to a durable key/value store alongside a shared
//!   per-kind timestamp, with a fixed time-to-live
//! - Notifies subscribed consumers on every mutation
//! - Converges with writes from other processes sharing the same store

mod broadcast;
mod cell;
mod clock;
mod expiry;
mod manager;
mod payload;
mod store;
mod sync;

pub use broadcast::Subscription;
pub use clock::{Clock, ManualClock, SystemClock};
pub use expiry::ExpiryPolicy;
pub use manager::CacheManager;
pub use payload::{Keyed, Payload};
pub use store::{MemoryStore, NoopStore, PersistentStore, SqliteStore};
pub use sync::SyncWatcher;
