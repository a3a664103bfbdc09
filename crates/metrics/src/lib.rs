//! Metrics and monitoring for the batch swap core
//!
//! This crate provides Prometheus metrics for swaps and confirmations plus
//! the tracing setup used by binaries.
//!
//! # Features
//!
//! - Prometheus metrics exposition in the text format
//! - A swap notifier that turns batch events into metrics
//! - Subscriber initialisation with env-filter and optional JSON output
//! - Per-batch spans carrying a batch id
//!
//! # Example
//!
//! ```no_run
//! use batch_swap_metrics::{init_tracing, MetricsCollector, MetricsNotifier};
//! use std::sync::Arc;
//!
//! init_tracing("info", false).unwrap();
//!
//! let collector = Arc::new(MetricsCollector::new());
//! let notifier = MetricsNotifier::new(collector.clone());
//!
//! // hand `notifier` to the orchestrator, then
//! println!("{}", collector.export_metrics().unwrap());
//! ```

pub mod collector;
pub mod metrics;
pub mod notifier;
pub mod tracing;

pub use collector::{MetricsCollector, MetricsError};
pub use notifier::MetricsNotifier;
pub use crate::tracing::{batch_span, init_tracing, BatchId, TracingError};
