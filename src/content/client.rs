//! Cached portal client: one manager per resource kind over a shared store.
//!
//! This is the surface the rendering layer consumes. `ensure_*` methods log
//! fetch failures and continue - the cache layer never raises an error into
//! the UI path, consumers always get a valid (possibly empty or stale)
//! snapshot.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cache::{CacheManager, PersistentStore, SqliteStore, SyncWatcher};
use crate::config::Config;
use crate::locale::Locale;

use super::api::ContentApi;
use super::{
  BlogDetail, BlogPost, GameDetail, GameSummary, HomeContent, NavigationMenu, BLOG, BLOG_DETAILS,
  GAME_DETAILS, GAME_LIST, HOME, NAVIGATION,
};

/// Portal content client with transparent per-locale caching.
#[derive(Clone)]
pub struct PortalClient {
  api: ContentApi,
  games: CacheManager<Vec<GameSummary>>,
  home: CacheManager<HomeContent>,
  blog: CacheManager<Vec<BlogPost>>,
  blog_details: CacheManager<Vec<BlogDetail>>,
  game_details: CacheManager<Vec<GameDetail>>,
  navigation: CacheManager<NavigationMenu>,
}

impl PortalClient {
  /// Create a client over the configured API and SQLite store.
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = config
      .api
      .base_url
      .as_deref()
      .ok_or_else(|| eyre!("api.base_url is not configured"))?;
    let api = ContentApi::new(base_url).map_err(|e| eyre!("Failed to create API client: {}", e))?;
    let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open_at(&config.db_path()?)?);

    Ok(Self::with_store(api, store, config))
  }

  /// Create a client over an explicit store (tests, ephemeral runs).
  pub fn with_store(api: ContentApi, store: Arc<dyn PersistentStore>, config: &Config) -> Self {
    // Spelled out per kind: each manager has its own payload type.
    let games = CacheManager::new(GAME_LIST, Arc::clone(&store)).with_ttl(config.ttl(GAME_LIST));
    let home = CacheManager::new(HOME, Arc::clone(&store)).with_ttl(config.ttl(HOME));
    let blog = CacheManager::new(BLOG, Arc::clone(&store)).with_ttl(config.ttl(BLOG));
    let blog_details =
      CacheManager::new(BLOG_DETAILS, Arc::clone(&store)).with_ttl(config.ttl(BLOG_DETAILS));
    let game_details =
      CacheManager::new(GAME_DETAILS, Arc::clone(&store)).with_ttl(config.ttl(GAME_DETAILS));
    let navigation =
      CacheManager::new(NAVIGATION, Arc::clone(&store)).with_ttl(config.ttl(NAVIGATION));

    Self {
      api,
      games,
      home,
      blog,
      blog_details,
      game_details,
      navigation,
    }
  }

  // ==========================================================================
  // Game list
  // ==========================================================================

  /// Make sure the game list for `locale` is loaded. Fetch failures are
  /// logged and swallowed; the cached (possibly empty) list keeps serving.
  pub async fn ensure_game_list(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .games
      .ensure(locale, force, move || async move { api.game_list(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached game list for {}: {}", locale, e);
    }
  }

  pub fn game_list(&self, locale: Locale) -> Vec<GameSummary> {
    self.games.get_by_locale(locale)
  }

  /// Direct handle for subscriptions and seeding.
  pub fn games(&self) -> &CacheManager<Vec<GameSummary>> {
    &self.games
  }

  // ==========================================================================
  // Home
  // ==========================================================================

  pub async fn ensure_home(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .home
      .ensure(locale, force, move || async move { api.home(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached home content for {}: {}", locale, e);
    }
  }

  pub fn home(&self, locale: Locale) -> HomeContent {
    self.home.get_by_locale(locale)
  }

  pub fn home_cache(&self) -> &CacheManager<HomeContent> {
    &self.home
  }

  // ==========================================================================
  // Blog list and details
  // ==========================================================================

  pub async fn ensure_blog(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .blog
      .ensure(locale, force, move || async move { api.blog(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached blog list for {}: {}", locale, e);
    }
  }

  pub fn blog(&self, locale: Locale) -> Vec<BlogPost> {
    self.blog.get_by_locale(locale)
  }

  pub fn blog_cache(&self) -> &CacheManager<Vec<BlogPost>> {
    &self.blog
  }

  pub async fn ensure_blog_details(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .blog_details
      .ensure(locale, force, move || async move { api.blog_details(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached blog details for {}: {}", locale, e);
    }
  }

  pub fn blog_details(&self, locale: Locale) -> Vec<BlogDetail> {
    self.blog_details.get_by_locale(locale)
  }

  pub fn blog_details_cache(&self) -> &CacheManager<Vec<BlogDetail>> {
    &self.blog_details
  }

  // ==========================================================================
  // Game details
  // ==========================================================================

  pub async fn ensure_game_details(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .game_details
      .ensure(locale, force, move || async move { api.game_details(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached game details for {}: {}", locale, e);
    }
  }

  pub fn game_details(&self, locale: Locale) -> Vec<GameDetail> {
    self.game_details.get_by_locale(locale)
  }

  pub fn game_details_cache(&self) -> &CacheManager<Vec<GameDetail>> {
    &self.game_details
  }

  // ==========================================================================
  // Navigation
  // ==========================================================================

  pub async fn ensure_navigation(&self, locale: Locale, force: bool) {
    let api = self.api.clone();
    let result = self
      .navigation
      .ensure(locale, force, move || async move { api.navigation(locale).await })
      .await;
    if let Err(e) = result {
      warn!("serving cached navigation for {}: {}", locale, e);
    }
  }

  pub fn navigation(&self, locale: Locale) -> NavigationMenu {
    self.navigation.get_by_locale(locale)
  }

  pub fn navigation_cache(&self) -> &CacheManager<NavigationMenu> {
    &self.navigation
  }

  // ==========================================================================
  // Whole-client operations
  // ==========================================================================

  /// Empty every resource kind's cache.
  pub fn clear_all(&self) {
    self.games.clear();
    self.home.clear();
    self.blog.clear();
    self.blog_details.clear();
    self.game_details.clear();
    self.navigation.clear();
  }

  /// Start cross-process watchers for every kind. The watchers stop when
  /// the returned handles are dropped.
  pub fn watch_all(&self, interval: Duration) -> Vec<SyncWatcher> {
    vec![
      self.games.watch(interval),
      self.home.watch(interval),
      self.blog.watch(interval),
      self.blog_details.watch(interval),
      self.game_details.watch(interval),
      self.navigation.watch(interval),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;
  use crate::content::NavItem;

  fn client_over(store: Arc<MemoryStore>) -> PortalClient {
    let api = ContentApi::new("http://localhost:9").unwrap();
    let config = Config::default();
    PortalClient::with_store(api, store, &config)
  }

  fn game(name: &str) -> GameSummary {
    GameSummary {
      name: name.to_string(),
      category: String::new(),
      thumbnail: String::new(),
      url: String::new(),
    }
  }

  #[tokio::test]
  async fn test_seeded_data_serves_without_network() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));

    client.games().update([(Locale::Zh, vec![game("X")])]);
    assert_eq!(client.game_list(Locale::Zh), vec![game("X")]);

    // A second client over the same store reconstructs the seeded value
    // from the durable copy, as another process would.
    let other = client_over(store);
    assert_eq!(other.game_list(Locale::Zh), vec![game("X")]);
  }

  #[tokio::test]
  async fn test_ensure_swallows_fetch_failure() {
    // Port 9 (discard) is not listening; the fetch fails and the client
    // keeps serving the empty default.
    let client = client_over(Arc::new(MemoryStore::new()));
    client.ensure_navigation(Locale::En, true).await;
    assert!(client.navigation(Locale::En).items.is_empty());
  }

  #[tokio::test]
  async fn test_clear_all_resets_every_kind() {
    let store = Arc::new(MemoryStore::new());
    let client = client_over(Arc::clone(&store));

    client.games().update([(Locale::En, vec![game("A")])]);
    client.navigation_cache().update_by_locale(
      Locale::En,
      NavigationMenu {
        items: vec![NavItem {
          label: "Games".to_string(),
          href: "/games".to_string(),
        }],
      },
    );

    client.clear_all();
    assert!(client.game_list(Locale::En).is_empty());
    assert!(client.navigation(Locale::En).items.is_empty());
    assert_eq!(store.read("game-list-value"), None);
    assert_eq!(store.read("navigation-value"), None);
  }
}
