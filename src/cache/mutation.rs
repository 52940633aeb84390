//! Write-side tracking.
//!
//! Mutations are never de-duplicated: each call is a distinct user intent.
//! The tracker only counts what is pending and runs the side-effect callbacks
//! before handing the result back.

use crate::metrics::Metrics;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts in-flight mutations for "saving..." style feedback.
#[derive(Debug, Clone, Default)]
pub struct MutationTracker {
    pending: Arc<AtomicUsize>,
    metrics: Metrics,
}

/// Releases one pending slot on drop, so abandoned mutations don't stay pending.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MutationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Metrics) -> Self {
        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            metrics,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_count() > 0
    }

    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Run `operation`, then `on_success` or `on_error`, then return its result.
    pub async fn mutate<T, E, Fut, S, R>(&self, operation: Fut, on_success: S, on_error: R) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T),
        R: FnOnce(&E),
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let _guard = PendingGuard(self.pending.clone());

        let result = operation.await;
        match &result {
            Ok(value) => {
                self.metrics.record_mutation(true);
                on_success(value);
            }
            Err(err) => {
                self.metrics.record_mutation(false);
                on_error(err);
            }
        }
        result
    }
}
