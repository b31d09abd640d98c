//! Reconciler Task
//!
//! Background task that periodically moves evicted entries to disk and
//! writes everything out on shutdown.
//!
//! Each wake-up checks the eviction buffer against the threshold and merges
//! it into the persistent store when it has grown too large. The sleep can be
//! interrupted to trigger the final full flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::LruPersistentCache;
use crate::config::Config;

// == Settings ==
/// Timing and threshold for the reconciler loop.
#[derive(Debug, Clone, Copy)]
pub struct ReconcilerSettings {
    /// Sleep between threshold checks
    pub interval: Duration,
    /// Buffer size that must be exceeded before a merge runs
    pub threshold: usize,
}

impl ReconcilerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.sleep_interval(),
            threshold: config.persist_threshold,
        }
    }
}

// == Handle ==
/// Control handle for a running reconciler.
#[derive(Debug)]
pub struct ReconcilerHandle {
    cache: Arc<LruPersistentCache>,
    running: Arc<AtomicBool>,
    flush_requested: Arc<AtomicBool>,
    interrupt: Arc<Notify>,
    task: JoinHandle<Option<bool>>,
}

impl ReconcilerHandle {
    // == Flush And Stop ==
    /// Interrupts the sleep, persists every tier and waits for the task.
    ///
    /// A request that lands during a merge is picked up once the merge
    /// completes. If the task already exited without flushing, the flush runs
    /// here instead. Returns true if the final save succeeded.
    pub async fn flush_and_stop(self) -> bool {
        self.flush_requested.store(true, Ordering::SeqCst);
        self.interrupt.notify_one();

        match self.task.await {
            Ok(Some(saved)) => saved,
            Ok(None) => flush_all(&self.cache).await,
            Err(err) => {
                warn!("Reconciler task failed before the final flush: {}", err);
                flush_all(&self.cache).await
            }
        }
    }

    // == Stop After Cycle ==
    /// Lets the current sleep run out, finishes that cycle and exits.
    ///
    /// No full flush is forced.
    pub fn stop_after_cycle(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Waits for the task to exit on its own.
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            warn!("Reconciler task ended abnormally: {}", err);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns the reconciler for `cache`.
///
/// The task alternates between sleeping for `settings.interval` and running
/// a threshold-gated merge on the blocking pool. It exits after a full flush
/// when interrupted through [`ReconcilerHandle::flush_and_stop`], or after
/// the current cycle once [`ReconcilerHandle::stop_after_cycle`] is called.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(LruPersistentCache::from_config(&config));
/// let reconciler = spawn_reconciler_task(cache.clone(), ReconcilerSettings::from_config(&config));
/// // Later, during shutdown:
/// reconciler.flush_and_stop().await;
/// ```
pub fn spawn_reconciler_task(
    cache: Arc<LruPersistentCache>,
    settings: ReconcilerSettings,
) -> ReconcilerHandle {
    let running = Arc::new(AtomicBool::new(true));
    let flush_requested = Arc::new(AtomicBool::new(false));
    let interrupt = Arc::new(Notify::new());

    let task = tokio::spawn({
        let cache = Arc::clone(&cache);
        let running = Arc::clone(&running);
        let flush_requested = Arc::clone(&flush_requested);
        let interrupt = Arc::clone(&interrupt);

        async move {
            info!(
                "Starting reconciler with interval of {:?} and threshold of {} entries",
                settings.interval, settings.threshold
            );

            while running.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = tokio::time::sleep(settings.interval) => {}
                    _ = interrupt.notified() => {
                        info!("Reconciler interrupted, persisting all data");
                        return Some(flush_all(&cache).await);
                    }
                }

                run_cycle(&cache, settings.threshold).await;
            }

            if flush_requested.load(Ordering::SeqCst) {
                info!("Reconciler stopping with a pending flush request");
                return Some(flush_all(&cache).await);
            }

            info!("Reconciler stopped after its final cycle");
            None
        }
    });

    ReconcilerHandle {
        cache,
        running,
        flush_requested,
        interrupt,
        task,
    }
}

/// One threshold check, plus a merge when the buffer is over the threshold.
async fn run_cycle(cache: &Arc<LruPersistentCache>, threshold: usize) {
    let cache = Arc::clone(cache);
    let outcome =
        tokio::task::spawn_blocking(move || cache.reconcile_if_needed(threshold)).await;

    match outcome {
        Ok(Some(cleared)) => info!("Reconciler flushed {} evicted entries", cleared),
        Ok(None) => debug!("Reconciler: eviction buffer below threshold"),
        Err(err) => warn!("Reconciler merge panicked: {}", err),
    }
}

/// Full merge of disk, buffer and hot map on the blocking pool.
async fn flush_all(cache: &Arc<LruPersistentCache>) -> bool {
    let cache = Arc::clone(cache);
    match tokio::task::spawn_blocking(move || cache.persist_all()).await {
        Ok(saved) => saved,
        Err(err) => {
            warn!("Shutdown flush panicked: {}", err);
            false
        }
    }
}
