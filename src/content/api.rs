//! HTTP client for the portal content API.
//!
//! Every endpoint returns an envelope `{ "data": ... }` with the full
//! payload for one locale. The shape is validated here, at the fetch
//! boundary: a missing `data` field or a payload that fails typed
//! deserialization is a `MalformedResponse`, never a silently-propagated
//! half-shape.

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::CacheError;
use crate::locale::Locale;

use super::{BlogDetail, BlogPost, GameDetail, GameSummary, HomeContent, NavigationMenu};

/// Content API client. One instance is shared by all resource kinds.
#[derive(Clone)]
pub struct ContentApi {
  client: reqwest::Client,
  base_url: Url,
}

impl ContentApi {
  pub fn new(base_url: &str) -> Result<Self, CacheError> {
    let base_url = Url::parse(base_url)
      .map_err(|e| CacheError::Network(format!("invalid API base URL {}: {}", base_url, e)))?;

    Ok(Self {
      client: reqwest::Client::new(),
      base_url,
    })
  }

  /// Fetch one kind's payload for one locale and validate its shape.
  async fn fetch<T: DeserializeOwned>(&self, kind: &str, locale: Locale) -> Result<T, CacheError> {
    let mut url = self
      .base_url
      .join(&format!("api/{}", kind))
      .map_err(|e| CacheError::Network(format!("invalid API path for {}: {}", kind, e)))?;
    url
      .query_pairs_mut()
      .append_pair("locale", locale.as_str());

    let body: Value = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    decode_envelope(body, kind)
  }

  pub async fn game_list(&self, locale: Locale) -> Result<Vec<GameSummary>, CacheError> {
    self.fetch(super::GAME_LIST, locale).await
  }

  pub async fn home(&self, locale: Locale) -> Result<HomeContent, CacheError> {
    self.fetch(super::HOME, locale).await
  }

  pub async fn blog(&self, locale: Locale) -> Result<Vec<BlogPost>, CacheError> {
    self.fetch(super::BLOG, locale).await
  }

  pub async fn blog_details(&self, locale: Locale) -> Result<Vec<BlogDetail>, CacheError> {
    self.fetch(super::BLOG_DETAILS, locale).await
  }

  pub async fn game_details(&self, locale: Locale) -> Result<Vec<GameDetail>, CacheError> {
    self.fetch(super::GAME_DETAILS, locale).await
  }

  pub async fn navigation(&self, locale: Locale) -> Result<NavigationMenu, CacheError> {
    self.fetch(super::NAVIGATION, locale).await
  }
}

/// Unwrap and validate the `{ "data": ... }` envelope of a decoded body.
fn decode_envelope<T: DeserializeOwned>(body: Value, kind: &str) -> Result<T, CacheError> {
  let data = body
    .get("data")
    .cloned()
    .ok_or_else(|| CacheError::MalformedResponse(format!("{} response has no data field", kind)))?;

  serde_json::from_value(data)
    .map_err(|e| CacheError::MalformedResponse(format!("{} payload: {}", kind, e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rejects_invalid_base_url() {
    assert!(matches!(
      ContentApi::new("not a url"),
      Err(CacheError::Network(_))
    ));
  }

  #[test]
  fn test_envelope_without_data_is_malformed() {
    let body: Value = serde_json::from_str(r#"{"result": []}"#).unwrap();
    let decoded: Result<Vec<BlogPost>, _> = decode_envelope(body, crate::content::BLOG);
    assert!(matches!(decoded, Err(CacheError::MalformedResponse(_))));
  }

  #[test]
  fn test_payload_shape_mismatch_is_malformed() {
    let body: Value = serde_json::from_str(r#"{"data": [{"title": 42}]}"#).unwrap();
    let decoded: Result<Vec<BlogPost>, _> = decode_envelope(body, crate::content::BLOG);
    assert!(matches!(decoded, Err(CacheError::MalformedResponse(_))));
  }

  #[test]
  fn test_well_formed_envelope_decodes() {
    let body: Value =
      serde_json::from_str(r#"{"data": [{"title": "Patch notes", "slug": "patch-notes"}]}"#)
        .unwrap();
    let decoded: Vec<BlogPost> = decode_envelope(body, crate::content::BLOG).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].title, "Patch notes");
    assert_eq!(decoded[0].slug, "patch-notes");
  }
}
