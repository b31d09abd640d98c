//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the list under
/// - `values`: The list that replaces any existing one
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The list to store
    #[serde(default)]
    pub values: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for POST /rightadd and POST /leftadd
#[derive(Debug, Clone, Deserialize)]
pub struct AddRequest {
    /// The cache key
    pub key: String,
    /// The single value to push
    pub value: String,
}

impl AddRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    None
}
