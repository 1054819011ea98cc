//! Domain records for the six cached resource kinds.
//!
//! List-shaped kinds (game list, blog, details) upsert by a natural key;
//! home and navigation are scalar and replace outright. Kind names double
//! as the persisted-key prefixes (`"<kind>-value"` / `"<kind>-timestamp"`).

pub mod api;
pub mod client;

use serde::{Deserialize, Serialize};

use crate::cache::{Keyed, Payload};

// ============================================================================
// Kind names
// ============================================================================

pub const GAME_LIST: &str = "game-list";
pub const HOME: &str = "home";
pub const BLOG: &str = "blog";
pub const BLOG_DETAILS: &str = "blog-details";
pub const GAME_DETAILS: &str = "game-details";
pub const NAVIGATION: &str = "navigation";

/// All resource kinds, in presentation order.
pub const ALL_KINDS: &[&str] = &[GAME_LIST, HOME, BLOG, BLOG_DETAILS, GAME_DETAILS, NAVIGATION];

// ============================================================================
// Domain records
// ============================================================================

/// One game in catalog listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
  pub name: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default)]
  pub url: String,
}

/// Full game page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
  pub slug: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub instructions: String,
  #[serde(default)]
  pub embed_url: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

/// One post in blog listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
  pub title: String,
  #[serde(default)]
  pub slug: String,
  #[serde(default)]
  pub excerpt: String,
  #[serde(default)]
  pub cover: String,
  #[serde(default)]
  pub published_at: String,
}

/// Full blog article content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDetail {
  pub slug: String,
  pub title: String,
  #[serde(default)]
  pub body_html: String,
  #[serde(default)]
  pub published_at: String,
}

/// Landing page content. Scalar: a fetch replaces the whole locale slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeContent {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub tagline: String,
  #[serde(default)]
  pub featured: Vec<GameSummary>,
}

/// One navigation link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
  pub label: String,
  pub href: String,
}

/// Site menu. Scalar: a fetch replaces the whole locale slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationMenu {
  #[serde(default)]
  pub items: Vec<NavItem>,
}

// ============================================================================
// Natural keys and merge semantics
// ============================================================================

impl Keyed for GameSummary {
  fn natural_key(&self) -> &str {
    &self.name
  }
}

impl Keyed for GameDetail {
  fn natural_key(&self) -> &str {
    &self.slug
  }
}

impl Keyed for BlogPost {
  fn natural_key(&self) -> &str {
    &self.title
  }
}

impl Keyed for BlogDetail {
  fn natural_key(&self) -> &str {
    &self.slug
  }
}

impl Payload for HomeContent {
  fn merge(&mut self, incoming: Self) {
    *self = incoming;
  }

  fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}

impl Payload for NavigationMenu {
  fn merge(&mut self, incoming: Self) {
    *self = incoming;
  }

  fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scalar_merge_replaces() {
    let mut cached = NavigationMenu {
      items: vec![NavItem {
        label: "Games".to_string(),
        href: "/games".to_string(),
      }],
    };
    cached.merge(NavigationMenu {
      items: vec![NavItem {
        label: "Blog".to_string(),
        href: "/blog".to_string(),
      }],
    });

    assert_eq!(cached.items.len(), 1);
    assert_eq!(cached.items[0].label, "Blog");
  }

  #[test]
  fn test_home_is_empty_matches_default() {
    assert!(HomeContent::default().is_empty());
    let home = HomeContent {
      title: "Play".to_string(),
      ..Default::default()
    };
    assert!(!home.is_empty());
  }

  #[test]
  fn test_game_list_upserts_by_name() {
    let mut cached = vec![GameSummary {
      name: "Snake".to_string(),
      category: "arcade".to_string(),
      thumbnail: String::new(),
      url: String::new(),
    }];
    cached.merge(vec![GameSummary {
      name: "Snake".to_string(),
      category: "classic".to_string(),
      thumbnail: String::new(),
      url: String::new(),
    }]);

    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].category, "classic");
  }
}
