//! Basic metrics instrumentation.
//!
//! Counters for backend requests, cache behaviour and mutation outcomes.
//! A single `Metrics` value is cheap to clone and shared by the client, the
//! query cache and the mutation tracker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Total number of HTTP requests made
    http_requests_total: Arc<AtomicU64>,

    /// Total number of HTTP errors
    http_errors_total: Arc<AtomicU64>,

    /// Total duration of all HTTP requests in milliseconds
    http_duration_total_ms: Arc<AtomicU64>,

    /// Number of service rows fetched
    services_fetched_total: Arc<AtomicU64>,

    /// Number of images stored
    images_uploaded_total: Arc<AtomicU64>,

    /// Queries answered from a fresh cache entry
    cache_hits_total: Arc<AtomicU64>,

    /// Queries that started a new fetch
    cache_misses_total: Arc<AtomicU64>,

    /// Queries that joined a fetch already in flight
    cache_joins_total: Arc<AtomicU64>,

    mutations_succeeded_total: Arc<AtomicU64>,
    mutations_failed_total: Arc<AtomicU64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_errors_total: Arc::new(AtomicU64::new(0)),
            http_duration_total_ms: Arc::new(AtomicU64::new(0)),
            services_fetched_total: Arc::new(AtomicU64::new(0)),
            images_uploaded_total: Arc::new(AtomicU64::new(0)),
            cache_hits_total: Arc::new(AtomicU64::new(0)),
            cache_misses_total: Arc::new(AtomicU64::new(0)),
            cache_joins_total: Arc::new(AtomicU64::new(0)),
            mutations_succeeded_total: Arc::new(AtomicU64::new(0)),
            mutations_failed_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an HTTP request with duration.
    pub fn record_http_request(&self, duration: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_duration_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record an HTTP error.
    pub fn record_http_error(&self) {
        self.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_services_fetched(&self, count: usize) {
        self.services_fetched_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_image_uploaded(&self) {
        self.images_uploaded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_join(&self) {
        self.cache_joins_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a mutation.
    pub fn record_mutation(&self, success: bool) {
        if success {
            self.mutations_succeeded_total
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.mutations_failed_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get total HTTP requests.
    pub fn http_requests_total(&self) -> u64 {
        self.http_requests_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP errors.
    pub fn http_errors_total(&self) -> u64 {
        self.http_errors_total.load(Ordering::Relaxed)
    }

    /// Get total HTTP duration in milliseconds.
    pub fn http_duration_total_ms(&self) -> u64 {
        self.http_duration_total_ms.load(Ordering::Relaxed)
    }

    /// Get average HTTP request duration in milliseconds.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let total = self.http_duration_total_ms.load(Ordering::Relaxed);
        let count = self.http_requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn services_fetched_total(&self) -> u64 {
        self.services_fetched_total.load(Ordering::Relaxed)
    }

    pub fn images_uploaded_total(&self) -> u64 {
        self.images_uploaded_total.load(Ordering::Relaxed)
    }

    pub fn cache_hits_total(&self) -> u64 {
        self.cache_hits_total.load(Ordering::Relaxed)
    }

    pub fn cache_misses_total(&self) -> u64 {
        self.cache_misses_total.load(Ordering::Relaxed)
    }

    pub fn cache_joins_total(&self) -> u64 {
        self.cache_joins_total.load(Ordering::Relaxed)
    }

    pub fn mutations_succeeded_total(&self) -> u64 {
        self.mutations_succeeded_total.load(Ordering::Relaxed)
    }

    pub fn mutations_failed_total(&self) -> u64 {
        self.mutations_failed_total.load(Ordering::Relaxed)
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        for counter in [
            &self.http_requests_total,
            &self.http_errors_total,
            &self.http_duration_total_ms,
            &self.services_fetched_total,
            &self.images_uploaded_total,
            &self.cache_hits_total,
            &self.cache_misses_total,
            &self.cache_joins_total,
            &self.mutations_succeeded_total,
            &self.mutations_failed_total,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get a summary of all metrics.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_total_ms: self.http_duration_total_ms(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            services_fetched_total: self.services_fetched_total(),
            images_uploaded_total: self.images_uploaded_total(),
            cache_hits_total: self.cache_hits_total(),
            cache_misses_total: self.cache_misses_total(),
            cache_joins_total: self.cache_joins_total(),
            mutations_succeeded_total: self.mutations_succeeded_total(),
            mutations_failed_total: self.mutations_failed_total(),
        }
    }
}

/// A snapshot of metrics values.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_total_ms: u64,
    pub http_duration_avg_ms: f64,
    pub services_fetched_total: u64,
    pub images_uploaded_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub cache_joins_total: u64,
    pub mutations_succeeded_total: u64,
    pub mutations_failed_total: u64,
}

/// Helper for timing HTTP requests.
pub struct HttpTimer {
    start: Instant,
    metrics: Metrics,
}

impl HttpTimer {
    /// Start timing an HTTP request.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Complete the timing and record the duration.
    pub fn complete(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
    }

    /// Complete the timing and record as an error.
    pub fn complete_with_error(self) {
        let duration = self.start.elapsed();
        self.metrics.record_http_request(duration);
        self.metrics.record_http_error();
    }
}
