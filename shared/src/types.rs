//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{SharedError, SharedResult};

/// Separator between tokens inside a delimited attribute field
pub const TOKEN_SEPARATOR: &str = ", ";

/// Field holding the comma separated skill list of a job posting
pub const JOB_SKILLS_FIELD: &str = "job_skills";

/// Field holding the country a job posting was found in
pub const SEARCH_COUNTRY_FIELD: &str = "search_country";

/// Field holding a document's identifier
pub const DOCUMENT_ID_FIELD: &str = "_id";

/// A job document as stored in the collection
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Names the document field aggregated into a distinct-value set.
///
/// The same name is used as the cache key, so one key always maps to exactly
/// one field and one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey(String);

impl AttributeKey {
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }

    pub fn job_skills() -> Self {
        Self::new(JOB_SKILLS_FIELD)
    }

    pub fn search_country() -> Self {
        Self::new(SEARCH_COUNTRY_FIELD)
    }

    /// Document field this key aggregates
    pub fn field(&self) -> &str {
        &self.0
    }

    /// Key under which the computed set is cached
    pub fn cache_key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered set of unique attribute values.
///
/// Equality is exact and case-sensitive. Iteration order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistinctValueSet(HashSet<String>);

impl DistinctValueSet {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// Insert a value, returning true if it was not already present
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Split a delimited field value and insert every token.
    ///
    /// Tokens are kept exactly as the split produces them, including any
    /// surrounding whitespace and empty tokens.
    pub fn extend_from_field(&mut self, raw: &str) -> usize {
        let mut added = 0;
        for token in raw.split(TOKEN_SEPARATOR) {
            if self.insert(token) {
                added += 1;
            }
        }
        added
    }

    /// Values in ascending order, for stable output
    pub fn into_sorted_vec(self) -> Vec<String> {
        let mut values: Vec<String> = self.0.into_iter().collect();
        values.sort();
        values
    }

    /// Encode as a JSON array of strings
    pub fn to_json(&self) -> SharedResult<String> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Decode from a JSON array of strings
    pub fn from_json(raw: &str) -> SharedResult<Self> {
        serde_json::from_str(raw).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }
}

impl FromIterator<String> for DistinctValueSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for DistinctValueSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl IntoIterator for DistinctValueSet {
    type Item = String;
    type IntoIter = hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Identifier of a job document, in 24 character hex form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    const LENGTH: usize = 24;

    pub fn parse(input: &str) -> SharedResult<Self> {
        if input.len() == Self::LENGTH && input.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(input.to_ascii_lowercase()))
        } else {
            Err(SharedError::InvalidDocumentId {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the identifier stored in a document, if it has a valid one
    pub fn from_document(document: &Document) -> Option<Self> {
        document
            .get(DOCUMENT_ID_FIELD)
            .and_then(|value| value.as_str())
            .and_then(|raw| Self::parse(raw).ok())
    }
}

impl FromStr for DocumentId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
