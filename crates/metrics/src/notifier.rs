use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use batch_swap_types::{SwapEvent, SwapNotifier};

use crate::collector::MetricsCollector;

/// Swap notifier that turns batch events into metrics.
///
/// Confirmation latency is measured from the `Submitted` event to the final
/// event for the same symbol. A batch never holds two swaps of one input token.
pub struct MetricsNotifier {
    collector: Arc<MetricsCollector>,
    in_flight: Mutex<HashMap<String, Instant>>,
}

impl MetricsNotifier {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self {
            collector,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn collector(&self) -> &Arc<MetricsCollector> {
        &self.collector
    }

    fn started(&self, symbol: &str) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.insert(symbol.to_string(), Instant::now());
        }
    }

    fn finished(&self, symbol: &str) -> Option<Duration> {
        let mut in_flight = self.in_flight.lock().ok()?;
        in_flight.remove(symbol).map(|start| start.elapsed())
    }
}

impl SwapNotifier for MetricsNotifier {
    fn notify(&self, event: &SwapEvent) {
        match event {
            SwapEvent::Submitted { symbol, .. } => {
                self.started(symbol);
                self.collector.record_swap_submitted();
            }
            SwapEvent::Succeeded { symbol, .. } => {
                let latency = self.finished(symbol);
                self.collector.record_swap_succeeded(latency);
            }
            SwapEvent::Failed { symbol, kind, .. } => {
                let latency = self.finished(symbol);
                self.collector.record_swap_failed(*kind, latency);
            }
            SwapEvent::Skipped { .. } => self.collector.record_swap_skipped(),
            SwapEvent::BatchCompleted { .. } => self.collector.record_batch_completed(),
        }
    }
}
