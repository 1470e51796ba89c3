//! Overall-progress reporting.
//!
//! Progress flows from the engine to the caller as a stream of
//! [`ProgressUpdate`] callbacks, never through shared mutable state. The
//! [`ProgressReporter`] owns the rescaling from page-local fractions to a
//! single overall fraction and guarantees the stream's contract: values in
//! the closed unit interval, monotonically non-decreasing within one job,
//! and exactly one tick equal to 1.0 at the end.
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One progress tick delivered to the caller.
///
/// `completed` is always `floor(overall * total)`; the final update of a
/// successful job has `overall == 1.0` and `completed == total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Overall fraction of the job, in `[0, 1]`.
    pub overall: f64,
    /// Number of fully completed pages.
    pub completed: usize,
    /// Total number of pages in the job.
    pub total: usize,
}

/// Receiver of progress ticks for one job.
///
/// Any `Fn(ProgressUpdate) + Send + Sync` closure is a sink; each job uses
/// its own sink, so ticks from concurrent jobs never interleave.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: ProgressUpdate) {
        self(update)
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Arc<S> {
    fn on_progress(&self, update: ProgressUpdate) {
        (**self).on_progress(update)
    }
}

/// Rescales page-local progress into the single overall fraction.
///
/// Engines report `(page_index, page_fraction)` pairs; the reporter computes
/// `(page_index + page_fraction) / total` so that overall progress is a
/// smooth function of both page count and per-page recognition depth rather
/// than a coarse per-page step function.
///
/// The reporter is the single enforcement point for the stream contract:
/// out-of-range fractions are clamped, regressive values are dropped, and a
/// second emission of exactly 1.0 is suppressed so the orchestrator's forced
/// final tick stays idempotent when the engine already reached 1.0 on its
/// last page.
pub struct ProgressReporter {
    total: usize,
    // f64 bits of the last emitted overall value; non-negative floats
    // compare the same as their bit patterns.
    last_bits: AtomicU64,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressReporter {
    pub fn new(total: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            total,
            last_bits: AtomicU64::new(0),
            sink,
        }
    }

    /// Total number of pages in the job this reporter serves.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Report page-local progress: `page_fraction` in `[0, 1]` for the page
    /// at `page_index`.
    pub fn page(&self, page_index: usize, page_fraction: f64) {
        if self.total == 0 {
            return;
        }
        let fraction = if page_fraction.is_finite() {
            page_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let overall = ((page_index as f64 + fraction) / self.total as f64).clamp(0.0, 1.0);
        self.emit(overall);
    }

    /// Emit the final 1.0 tick. Idempotent: a no-op when 1.0 was already
    /// delivered.
    pub fn finish(&self) {
        self.emit(1.0);
    }

    fn emit(&self, overall: f64) {
        let mut prev = self.last_bits.load(Ordering::Acquire);
        loop {
            let prev_val = f64::from_bits(prev);
            if overall < prev_val {
                return;
            }
            if overall == 1.0 && prev_val == 1.0 {
                return;
            }
            match self
                .last_bits
                .compare_exchange(prev, overall.to_bits(), Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(actual) => prev = actual,
            }
        }

        let completed = ((overall * self.total as f64).floor() as usize).min(self.total);
        self.sink.on_progress(ProgressUpdate {
            overall,
            completed,
            total: self.total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_sink() -> (Arc<dyn ProgressSink>, Arc<Mutex<Vec<ProgressUpdate>>>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&updates);
        let sink: Arc<dyn ProgressSink> = Arc::new(move |update: ProgressUpdate| {
            recorded.lock().unwrap().push(update);
        });
        (sink, updates)
    }

    fn overalls(updates: &Arc<Mutex<Vec<ProgressUpdate>>>) -> Vec<f64> {
        updates.lock().unwrap().iter().map(|u| u.overall).collect()
    }

    #[test]
    fn test_rescaling_two_pages() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(2, sink);

        for page in 0..2 {
            for fraction in [0.0, 0.5, 1.0] {
                reporter.page(page, fraction);
            }
        }

        assert_eq!(overalls(&updates), vec![0.0, 0.25, 0.5, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_finish_is_idempotent_after_engine_reached_one() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(1, sink);

        reporter.page(0, 1.0);
        reporter.finish();
        reporter.finish();

        let ticks = overalls(&updates);
        assert_eq!(ticks, vec![1.0]);
    }

    #[test]
    fn test_finish_supplies_missing_final_tick() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(3, sink);

        reporter.page(2, 0.97);
        reporter.finish();

        let recorded = updates.lock().unwrap();
        let last = recorded.last().unwrap();
        assert_eq!(last.overall, 1.0);
        assert_eq!(last.completed, 3);
        assert_eq!(last.total, 3);
    }

    #[test]
    fn test_regressive_values_are_dropped() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(4, sink);

        reporter.page(2, 0.5);
        reporter.page(1, 0.0);
        reporter.page(3, 0.0);

        assert_eq!(overalls(&updates), vec![0.625, 0.75]);
    }

    #[test]
    fn test_fractions_are_clamped() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(2, sink);

        reporter.page(0, -0.5);
        reporter.page(0, 7.0);
        reporter.page(1, f64::NAN);

        assert_eq!(overalls(&updates), vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_completed_is_floor_of_scaled_overall() {
        let (sink, updates) = recording_sink();
        let reporter = ProgressReporter::new(3, sink);

        reporter.page(0, 0.9);
        reporter.page(1, 0.0);
        reporter.page(1, 1.0);

        let recorded = updates.lock().unwrap();
        assert_eq!(recorded[0].completed, 0);
        assert_eq!(recorded[1].completed, 1);
        assert_eq!(recorded[2].completed, 2);
    }
}
