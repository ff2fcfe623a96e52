//! Metric tag set
//!
//! Ordered `key:value` labels attached to every metric point of a report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest tag value kept before truncation
pub const MAX_TAG_VALUE_LEN: usize = 200;

/// Ordered sequence of `key:value` tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `key:value`, normalizing the value
    pub fn push(&mut self, key: &str, value: &str) {
        self.0.push(format!("{}:{}", key, normalize_tag_value(value)));
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.push(key, value);
        self
    }

    /// Value of the first tag with `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find_map(|tag| {
            tag.split_once(':')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Restrict a tag value to the characters metrics backends index
///
/// Anything outside `[A-Za-z0-9_.:/,-]` becomes `_`, and the value is cut to
/// [`MAX_TAG_VALUE_LEN`] characters. Empty values become `unknown`.
pub fn normalize_tag_value(value: &str) -> String {
    let normalized: String = value
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' | ':' | '/' | ',' | '-' => c,
            _ => '_',
        })
        .take(MAX_TAG_VALUE_LEN)
        .collect();

    if normalized.is_empty() {
        "unknown".to_string()
    } else {
        normalized
    }
}
