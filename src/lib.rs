//! LRU Persist - A list-valued LRU cache server
//!
//! Keeps a bounded set of hot keys in memory, stages evicted entries in a
//! buffer and reconciles them to a single disk file in the background.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod protocol;
pub mod tasks;

pub use api::AppState;
pub use cache::LruPersistentCache;
pub use config::Config;
pub use tasks::{spawn_reconciler_task, ReconcilerHandle, ReconcilerSettings};
