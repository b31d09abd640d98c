//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_keys_handler, get_handler, health_handler, keys_handler, left_add_handler,
    right_add_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Replace the list under a key
/// - `GET /get/:key` - Retrieve the list under a key
/// - `GET /keys/:prefix` - List keys starting with a prefix
/// - `GET /keys` - List every key
/// - `POST /rightadd` - Append a value
/// - `POST /leftadd` - Prepend a value
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/keys", get(all_keys_handler))
        .route("/keys/:prefix", get(keys_handler))
        .route("/rightadd", post(right_add_handler))
        .route("/leftadd", post(left_add_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
