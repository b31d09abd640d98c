//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Reconciler: Flushes evicted entries to disk and performs the shutdown flush

mod reconciler;

pub use reconciler::{spawn_reconciler_task, ReconcilerHandle, ReconcilerSettings};
