//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, Side};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored list
    pub values: Vec<String>,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new<I>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            key: key.into(),
            values: values.into_iter().collect(),
        }
    }
}

/// Response body for the prefix scan (GET /keys/:prefix)
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    /// The prefix that was matched
    pub prefix: String,
    /// Matching keys in lexicographic order
    pub keys: Vec<String>,
}

impl KeysResponse {
    pub fn new<I>(prefix: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            prefix: prefix.into(),
            keys: keys.into_iter().collect(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for POST /rightadd and POST /leftadd
#[derive(Debug, Clone, Serialize)]
pub struct AddResponse {
    /// Success message
    pub message: String,
    /// The key that was extended
    pub key: String,
    /// Which end received the value
    pub side: Side,
}

impl AddResponse {
    pub fn new(key: impl Into<String>, side: Side) -> Self {
        let key = key.into();
        let end = match side {
            Side::Left => "front",
            Side::Right => "back",
        };
        Self {
            message: format!("Value added to the {} of '{}'", end, key),
            key,
            side,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Raw counters and tier sizes
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Fraction of lookups found in any tier
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["values"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_keys_response_serialize() {
        let resp = KeysResponse::new("ab", vec!["abc".to_string()]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["keys"], serde_json::json!(["abc"]));
    }

    #[test]
    fn test_add_response_side() {
        let resp = AddResponse::new("list", Side::Left);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["side"], "left");
        assert!(resp.message.contains("front"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();
        assert_eq!(json["hits"], 3);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
