//! Merge semantics for cached payloads.
//!
//! List-shaped payloads merge by keyed upsert; scalar payloads replace
//! outright. `is_empty` is what the fetch orchestrator uses to decide
//! whether a locale's slice still needs a first load.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Records in list-shaped payloads carry a natural key (name, slug, title)
/// used for in-place upserts.
pub trait Keyed {
  fn natural_key(&self) -> &str;
}

/// A value cacheable per locale.
pub trait Payload:
  Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + 'static
{
  /// Merge fresh data into the cached slice.
  fn merge(&mut self, incoming: Self);

  /// Whether this slice counts as "not yet loaded".
  fn is_empty(&self) -> bool;
}

/// Keyed upsert: a record whose key is already cached replaces it in place
/// (length unchanged); a record with a new key is appended (length + 1).
impl<T> Payload for Vec<T>
where
  T: Keyed + Clone + PartialEq + Serialize + DeserializeOwned + Send + 'static,
{
  fn merge(&mut self, incoming: Self) {
    for record in incoming {
      match self
        .iter_mut()
        .find(|existing| existing.natural_key() == record.natural_key())
      {
        Some(existing) => *existing = record,
        None => self.push(record),
      }
    }
  }

  fn is_empty(&self) -> bool {
    Vec::is_empty(self)
  }
}

// Plain strings are their own key; several module tests cache Vec<String>.
#[cfg(test)]
impl Keyed for String {
  fn natural_key(&self) -> &str {
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Record {
    name: String,
    score: u32,
  }

  impl Keyed for Record {
    fn natural_key(&self) -> &str {
      &self.name
    }
  }

  fn record(name: &str, score: u32) -> Record {
    Record {
      name: name.to_string(),
      score,
    }
  }

  #[test]
  fn test_upsert_replaces_in_place() {
    let mut cached = vec![record("a", 1), record("b", 2)];
    cached.merge(vec![record("a", 9)]);

    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0], record("a", 9));
    assert_eq!(cached[1], record("b", 2));
  }

  #[test]
  fn test_upsert_appends_new_keys() {
    let mut cached = vec![record("a", 1)];
    cached.merge(vec![record("b", 2), record("c", 3)]);

    assert_eq!(cached.len(), 3);
    assert_eq!(cached[1].name, "b");
    assert_eq!(cached[2].name, "c");
  }

  #[test]
  fn test_merge_into_empty() {
    let mut cached: Vec<Record> = Vec::new();
    assert!(Payload::is_empty(&cached));
    cached.merge(vec![record("a", 1)]);
    assert!(!Payload::is_empty(&cached));
  }
}
