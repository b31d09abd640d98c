//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{values_of, LruPersistentCache, Side};
use crate::error::{CacheError, Result};
use crate::models::{
    AddRequest, AddResponse, GetResponse, HealthResponse, KeysResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared by the HTTP handlers and line protocol sessions.
///
/// The cache synchronizes itself, so it is shared through a plain Arc.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache engine
    pub cache: Arc<LruPersistentCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Arc<LruPersistentCache>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the cache over the configured persistence file.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(Arc::new(LruPersistentCache::from_config(config)))
    }

    /// Runs a cache operation on the blocking pool.
    ///
    /// Misses read the persistence file, so cache calls stay off the async
    /// worker threads.
    pub async fn run<F, R>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&LruPersistentCache) -> R + Send + 'static,
        R: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|err| CacheError::Internal(err.to_string()))
    }
}

/// Handler for PUT /set
///
/// Replaces the list stored under a key.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = req.key.clone();
    state
        .run(move |cache| cache.set(&req.key, values_of(req.values)))
        .await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves the list stored under a key from whichever tier holds it.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let values = state
        .run(move |cache| cache.get(&lookup))
        .await?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, values)))
}

/// Handler for GET /keys/:prefix
///
/// Lists every key starting with the prefix.
pub async fn keys_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<KeysResponse>> {
    let scan = prefix.clone();
    let keys = state.run(move |cache| cache.get_all_keys(&scan)).await?;

    Ok(Json(KeysResponse::new(prefix, keys)))
}

/// Handler for GET /keys
///
/// Lists every key.
pub async fn all_keys_handler(State(state): State<AppState>) -> Result<Json<KeysResponse>> {
    keys_handler(State(state), Path(String::new())).await
}

/// Handler for POST /rightadd
pub async fn right_add_handler(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<AddResponse>> {
    add(state, req, Side::Right).await
}

/// Handler for POST /leftadd
pub async fn left_add_handler(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<AddResponse>> {
    add(state, req, Side::Left).await
}

async fn add(state: AppState, req: AddRequest, side: Side) -> Result<Json<AddResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = req.key.clone();
    state
        .run(move |cache| match side {
            Side::Right => cache.right_add(&req.key, req.value),
            Side::Left => cache.left_add(&req.key, req.value),
        })
        .await?;

    Ok(Json(AddResponse::new(key, side)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
