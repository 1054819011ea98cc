//! Locale-keyed content cache for the multi-language game portal.
//!
//! Six resource kinds (game list, home, blog, blog details, game details,
//! navigation) share one generic cache abstraction: a per-kind in-memory
//! [`locale::LocaleMap`] persisted to a durable key/value store with a fixed
//! time-to-live, a subscription broadcaster so any number of consumers
//! re-render in sync, and a cross-process watcher converging tabs/processes
//! that share the store.

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod locale;

pub use cache::CacheManager;
pub use config::Config;
pub use content::client::PortalClient;
pub use error::CacheError;
pub use locale::{Locale, LocaleMap};
