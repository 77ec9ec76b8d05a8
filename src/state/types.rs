//! Resume state types
//!
//! Serialized to JSON and persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Continuation tokens left over from earlier fetches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Per-operation entries, keyed by `service:operation`
    #[serde(default)]
    pub operations: BTreeMap<String, ResumeEntry>,
}

impl ResumeState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Token stored for an operation
    pub fn get_token(&self, key: &str) -> Option<&str> {
        self.operations.get(key).map(|entry| entry.token.as_str())
    }

    /// Store a token for an operation
    pub fn set_token(&mut self, key: &str, token: String) {
        self.operations
            .insert(key.to_string(), ResumeEntry::new(token));
    }

    /// Forget an operation; returns whether an entry existed
    pub fn clear(&mut self, key: &str) -> bool {
        self.operations.remove(key).is_some()
    }
}

/// One saved continuation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeEntry {
    /// Token to pass as the initial token next time
    pub token: String,
    /// When the token was saved
    pub updated_at: DateTime<Utc>,
}

impl ResumeEntry {
    /// Entry stamped with the current time
    pub fn new(token: String) -> Self {
        Self {
            token,
            updated_at: Utc::now(),
        }
    }
}
