use std::time::Duration;

use batch_swap_types::FailureKind;
use prometheus::{Encoder, TextEncoder};

use crate::metrics::*;

/// Records batch swap metrics into the process-wide registry
#[derive(Debug, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a swap accepted by the ledger
    pub fn record_swap_submitted(&self) {
        SWAPS_SUBMITTED.inc();
        PENDING_TRANSACTIONS.inc();
    }

    /// Record a confirmed swap and how long confirmation took
    pub fn record_swap_succeeded(&self, latency: Option<Duration>) {
        SWAPS_SUCCEEDED.inc();
        self.resolve(latency);
    }

    /// Record a failed swap.
    ///
    /// Rejected swaps never reached the ledger, so they do not touch the
    /// pending gauge.
    pub fn record_swap_failed(&self, kind: FailureKind, latency: Option<Duration>) {
        SWAPS_FAILED.with_label_values(&[kind.as_str()]).inc();
        if kind != FailureKind::Rejected {
            self.resolve(latency);
        }
    }

    pub fn record_swap_skipped(&self) {
        SWAPS_SKIPPED.inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_batch_completed(&self) {
        BATCHES_COMPLETED.inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIRMATION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Overwrite the pending gauge, e.g. from a transaction store count
    pub fn set_pending_transactions(&self, count: usize) {
        PENDING_TRANSACTIONS.set(count as i64);
    }

    pub fn record_confirmation_latency(&self, latency: Duration) {
        CONFIRMATION_LATENCY.observe(latency.as_millis() as f64);
    }

    fn resolve(&self, latency: Option<Duration>) {
        if PENDING_TRANSACTIONS.get() > 0 {
            PENDING_TRANSACTIONS.dec();
        }
        if let Some(latency) = latency {
            self.record_confirmation_latency(latency);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Export all metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}
