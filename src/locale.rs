//! Supported locales and the locale-keyed map every cached resource uses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of locales the portal serves content in.
///
/// Serializes as the lowercase language code (`"en"`, `"zh"`, ...), which
/// also makes it usable as a JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  En,
  Zh,
  Ru,
  Es,
  Vi,
  Hi,
  Fr,
  Tl,
  Ja,
  Ko,
}

/// All supported locales in stable presentation order.
pub const ALL_LOCALES: &[Locale] = &[
  Locale::En,
  Locale::Zh,
  Locale::Ru,
  Locale::Es,
  Locale::Vi,
  Locale::Hi,
  Locale::Fr,
  Locale::Tl,
  Locale::Ja,
  Locale::Ko,
];

impl Locale {
  /// Canonical lowercase language code.
  pub const fn as_str(self) -> &'static str {
    match self {
      Locale::En => "en",
      Locale::Zh => "zh",
      Locale::Ru => "ru",
      Locale::Es => "es",
      Locale::Vi => "vi",
      Locale::Hi => "hi",
      Locale::Fr => "fr",
      Locale::Tl => "tl",
      Locale::Ja => "ja",
      Locale::Ko => "ko",
    }
  }

  /// Parse a locale value, tolerant of case and region tags
  /// (`"zh-CN"` and `"ZH_tw"` both map to `Zh`).
  pub fn parse(value: &str) -> Option<Self> {
    let value = value.trim();
    if value.is_empty() {
      return None;
    }
    let normalized = value.to_ascii_lowercase();
    let lang = normalized.split(['-', '_']).next().unwrap_or("");
    match lang {
      "en" => Some(Locale::En),
      "zh" => Some(Locale::Zh),
      "ru" => Some(Locale::Ru),
      "es" => Some(Locale::Es),
      "vi" => Some(Locale::Vi),
      "hi" => Some(Locale::Hi),
      "fr" => Some(Locale::Fr),
      "tl" => Some(Locale::Tl),
      "ja" => Some(Locale::Ja),
      "ko" => Some(Locale::Ko),
      _ => None,
    }
  }
}

impl fmt::Display for Locale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A map carrying one `T` per supported locale.
///
/// Invariant: once constructed, every locale key is present - an untouched
/// locale holds `T::default()`, never an absent entry. Deserializing a map
/// with missing keys (e.g. persisted by an older build with fewer locales)
/// fills the gaps with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleMap<T> {
  entries: BTreeMap<Locale, T>,
}

impl<T: Default> LocaleMap<T> {
  /// A map with every locale set to its default value.
  pub fn new() -> Self {
    Self::from_entries(BTreeMap::new())
  }

  fn from_entries(mut entries: BTreeMap<Locale, T>) -> Self {
    for locale in ALL_LOCALES {
      entries.entry(*locale).or_default();
    }
    Self { entries }
  }

  pub fn get(&self, locale: Locale) -> &T {
    // Every locale key is present by construction.
    &self.entries[&locale]
  }

  pub fn get_mut(&mut self, locale: Locale) -> &mut T {
    self.entries.entry(locale).or_default()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Locale, &T)> {
    self.entries.iter().map(|(locale, value)| (*locale, value))
  }
}

impl<T: Default> Default for LocaleMap<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Serialize> Serialize for LocaleMap<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.entries.serialize(serializer)
  }
}

impl<'de, T: DeserializeOwned + Default> Deserialize<'de> for LocaleMap<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let entries = BTreeMap::<Locale, T>::deserialize(deserializer)?;
    Ok(Self::from_entries(entries))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_tolerates_region_tags() {
    assert_eq!(Locale::parse("zh-CN"), Some(Locale::Zh));
    assert_eq!(Locale::parse("ZH_tw"), Some(Locale::Zh));
    assert_eq!(Locale::parse("  en  "), Some(Locale::En));
    assert_eq!(Locale::parse("pt"), None);
    assert_eq!(Locale::parse(""), None);
  }

  #[test]
  fn test_new_map_has_every_locale() {
    let map: LocaleMap<Vec<String>> = LocaleMap::new();
    assert_eq!(map.iter().count(), ALL_LOCALES.len());
    for locale in ALL_LOCALES {
      assert!(map.get(*locale).is_empty());
    }
  }

  #[test]
  fn test_deserialize_fills_missing_locales() {
    let json = r#"{"en": ["a"], "zh": ["b"]}"#;
    let map: LocaleMap<Vec<String>> = serde_json::from_str(json).unwrap();
    assert_eq!(map.get(Locale::En), &vec!["a".to_string()]);
    assert_eq!(map.get(Locale::Zh), &vec!["b".to_string()]);
    assert!(map.get(Locale::Ko).is_empty());
    assert_eq!(map.iter().count(), ALL_LOCALES.len());
  }

  #[test]
  fn test_roundtrip_preserves_values() {
    let mut map: LocaleMap<Vec<String>> = LocaleMap::new();
    map.get_mut(Locale::Ja).push("x".to_string());
    let json = serde_json::to_string(&map).unwrap();
    let back: LocaleMap<Vec<String>> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, back);
  }
}
