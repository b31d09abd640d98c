//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Replace the list under a key
//! - `GET /get/:key` - Retrieve the list under a key
//! - `GET /keys/:prefix` - List keys starting with a prefix
//! - `POST /rightadd` - Append a value to a list
//! - `POST /leftadd` - Prepend a value to a list
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
