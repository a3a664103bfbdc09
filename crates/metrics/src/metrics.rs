use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Swaps accepted by the ledger
    pub static ref SWAPS_SUBMITTED: IntCounter = register_int_counter!(
        "batch_swap_swaps_submitted_total",
        "Total number of swaps submitted to the ledger"
    )
    .unwrap();

    /// Swaps the ledger confirmed
    pub static ref SWAPS_SUCCEEDED: IntCounter = register_int_counter!(
        "batch_swap_swaps_succeeded_total",
        "Total number of swaps confirmed successful"
    )
    .unwrap();

    /// Failed swaps by failure stage
    pub static ref SWAPS_FAILED: IntCounterVec = register_int_counter_vec!(
        "batch_swap_swaps_failed_total",
        "Total number of failed swaps by reason",
        &["reason"]
    )
    .unwrap();

    /// Swaps left out because their price impact was too high
    pub static ref SWAPS_SKIPPED: IntCounter = register_int_counter!(
        "batch_swap_swaps_skipped_total",
        "Total number of swaps skipped for price impact"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Batches run to completion
    pub static ref BATCHES_COMPLETED: IntCounter = register_int_counter!(
        "batch_swap_batches_completed_total",
        "Total number of batches completed"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIRMATION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Submitted swaps still waiting for a final status
    pub static ref PENDING_TRANSACTIONS: IntGauge = register_int_gauge!(
        "batch_swap_pending_transactions",
        "Current number of submitted swaps awaiting confirmation"
    )
    .unwrap();

    /// Time from submission to final status (in milliseconds)
    pub static ref CONFIRMATION_LATENCY: Histogram = register_histogram!(
        "batch_swap_confirmation_latency_ms",
        "Swap confirmation latency in milliseconds",
        vec![250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0, 32000.0, 60000.0]
    )
    .unwrap();
}
