use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::FailureKind;

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceOutcome {
    Success,
    Failure(FailureKind),
}

/// One finished flow invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub invocation_id: Uuid,
    pub flow: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub outcome: TraceOutcome,
}

/// Trait for recording invocation traces.
pub trait Telemetry: Send + Sync {
    fn record(&self, entry: TraceEntry);
}

/// In-memory collector for traces.
///
/// Unbounded by default, which suits tests and short-lived processes. A
/// long-running service should use [`MemoryTelemetry::bounded`] or
/// [`drain`](MemoryTelemetry::drain) periodically.
#[derive(Default)]
pub struct MemoryTelemetry {
    traces: Mutex<VecDeque<TraceEntry>>,
    capacity: Option<usize>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the most recent `capacity` traces.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            traces: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn traces(&self) -> Vec<TraceEntry> {
        self.traces
            .lock()
            .map(|traces| Vec::from(traces.clone()))
            .unwrap_or_default()
    }

    /// Removes and returns every collected trace, oldest first.
    pub fn drain(&self) -> Vec<TraceEntry> {
        self.traces
            .lock()
            .map(|mut traces| Vec::from(std::mem::take(&mut *traces)))
            .unwrap_or_default()
    }

    /// Number of failed invocations per failure kind.
    pub fn failure_counts(&self) -> HashMap<FailureKind, usize> {
        let mut counts = HashMap::new();
        for entry in self.traces() {
            if let TraceOutcome::Failure(kind) = entry.outcome {
                *counts.entry(kind).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, entry: TraceEntry) {
        match self.traces.lock() {
            Ok(mut traces) => {
                if let Some(capacity) = self.capacity {
                    if capacity == 0 {
                        return;
                    }
                    while traces.len() >= capacity {
                        traces.pop_front();
                    }
                }
                traces.push_back(entry);
            }
            Err(_) => log::warn!("Trace for flow '{}' dropped: collector poisoned", entry.flow),
        }
    }
}
