//! Timing instrumentation for the three phases of a query.
//!
//! The total is always the sum of the recorded phases, never a separate
//! clock reading.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// A phase of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Normalizer and local request construction
    RequestPreparation,
    /// Network round trip to the provider
    KbRetrieval,
    /// Shaping the raw response into an interaction
    ResponseProcessing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestPreparation => "request_preparation",
            Self::KbRetrieval => "kb_retrieval",
            Self::ResponseProcessing => "response_processing",
        }
    }
}

/// Elapsed seconds per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub total: f64,
    pub request_preparation: f64,
    pub kb_retrieval: f64,
    pub response_processing: f64,
}

impl Timing {
    /// Build a timing from per-phase seconds; the total is their sum.
    pub fn from_phases(request_preparation: f64, kb_retrieval: f64, response_processing: f64) -> Self {
        Self {
            total: request_preparation + kb_retrieval + response_processing,
            request_preparation,
            kb_retrieval,
            response_processing,
        }
    }
}

/// Accumulates phase durations for one query.
///
/// Phases that never ran are reported as zero.
#[derive(Debug, Clone, Default)]
pub struct TimingRecorder {
    request_preparation: Duration,
    kb_retrieval: Duration,
    response_processing: Duration,
}

impl TimingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elapsed` to `phase`.
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        let slot = match phase {
            Phase::RequestPreparation => &mut self.request_preparation,
            Phase::KbRetrieval => &mut self.kb_retrieval,
            Phase::ResponseProcessing => &mut self.response_processing,
        };
        *slot += elapsed;
        tracing::debug!(phase = phase.as_str(), elapsed_secs = elapsed.as_secs_f64(), "phase finished");
    }

    /// Run `f`, attributing its wall-clock time to `phase`.
    pub fn measure<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(phase, start.elapsed());
        out
    }

    /// Await `fut`, attributing its wall-clock time to `phase`.
    pub async fn measure_async<F>(&mut self, phase: Phase, fut: F) -> F::Output
    where
        F: Future,
    {
        let start = Instant::now();
        let out = fut.await;
        self.record(phase, start.elapsed());
        out
    }

    /// Snapshot the phases recorded so far.
    pub fn finish(&self) -> Timing {
        Timing::from_phases(
            self.request_preparation.as_secs_f64(),
            self.kb_retrieval.as_secs_f64(),
            self.response_processing.as_secs_f64(),
        )
    }
}
