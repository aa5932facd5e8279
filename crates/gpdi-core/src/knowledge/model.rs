//! Knowledge base domain model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from canonical-language phrase to the responses taught for it.
///
/// Keys iterate in ascending byte order, which is also the order the fuzzy
/// matcher uses to break ties. Response lists keep teaching order and may
/// contain duplicates.
///
/// Every key has at least one response. The only mutator is [`teach`], and
/// deserialization rejects records with empty response lists, so the
/// invariant cannot be broken from outside this module.
///
/// [`teach`]: KnowledgeBase::teach
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, Vec<String>>,
}

/// What [`KnowledgeBase::teach`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeachOutcome {
    /// A new key was created with a single response.
    NewEntry,
    /// An existing key gained one more response; `responses` is the new count.
    Extended { responses: usize },
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a knowledge base from raw entries, rejecting keys without responses.
    pub fn from_entries(entries: BTreeMap<String, Vec<String>>) -> Result<Self, String> {
        if let Some((key, _)) = entries.iter().find(|(_, responses)| responses.is_empty()) {
            return Err(format!("key '{}' has no responses", key));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in tie-break order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn responses(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, responses)| (key.as_str(), responses.as_slice()))
    }

    /// Records `response` for `query`.
    ///
    /// Existing keys get the response appended; nothing is ever replaced or
    /// deduplicated.
    pub fn teach(&mut self, query: impl Into<String>, response: impl Into<String>) -> TeachOutcome {
        let responses = self.entries.entry(query.into()).or_default();
        responses.push(response.into());
        if responses.len() == 1 {
            TeachOutcome::NewEntry
        } else {
            TeachOutcome::Extended {
                responses: responses.len(),
            }
        }
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for KnowledgeBase {
    type Error = String;

    fn try_from(entries: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<KnowledgeBase> for BTreeMap<String, Vec<String>> {
    fn from(base: KnowledgeBase) -> Self {
        base.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teach_new_key() {
        let mut base = KnowledgeBase::new();
        assert_eq!(base.teach("merhaba", "selam"), TeachOutcome::NewEntry);
        assert_eq!(base.responses("merhaba").unwrap(), &["selam".to_string()]);
    }

    #[test]
    fn test_teach_is_additive() {
        let mut base = KnowledgeBase::new();
        base.teach("merhaba", "selam");
        base.teach("merhaba", "hi");
        let outcome = base.teach("merhaba", "selam");

        assert_eq!(outcome, TeachOutcome::Extended { responses: 3 });
        assert_eq!(
            base.responses("merhaba").unwrap(),
            &["selam".to_string(), "hi".to_string(), "selam".to_string()]
        );
    }

    #[test]
    fn test_keys_iterate_in_byte_order() {
        let mut base = KnowledgeBase::new();
        base.teach("zebra", "z");
        base.teach("apple", "a");
        base.teach("çay", "tea");
        let keys: Vec<&str> = base.keys().collect();
        assert_eq!(keys, vec!["apple", "zebra", "çay"]);
    }

    #[test]
    fn test_from_entries_rejects_empty_responses() {
        let mut entries = BTreeMap::new();
        entries.insert("hello".to_string(), Vec::new());
        assert!(KnowledgeBase::from_entries(entries).is_err());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut base = KnowledgeBase::new();
        base.teach("günaydın", "iyi sabahlar");
        let json = serde_json::to_string(&base).unwrap();
        assert_eq!(json, r#"{"günaydın":["iyi sabahlar"]}"#);

        let back: KnowledgeBase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, base);
    }

    #[test]
    fn test_deserialize_rejects_empty_responses() {
        let result: Result<KnowledgeBase, _> = serde_json::from_str(r#"{"hello": []}"#);
        assert!(result.is_err());
    }
}
