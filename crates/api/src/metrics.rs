use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use synth::AnalysisStatus;

pub struct Metrics {
    // Counters
    polls: AtomicUsize,
    polls_processed: AtomicUsize,
    submissions: AtomicUsize,
    rejected_submissions: AtomicUsize,
    failed_submissions: AtomicUsize,
    completion_warnings: AtomicUsize,
    defaulted_fetches: AtomicUsize,
    fetches: AtomicUsize,
    completions: AtomicUsize,

    // Timing (in microseconds)
    total_fetch_time_us: AtomicU64,
    total_completion_time_us: AtomicU64,
}

/// How a book submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { warned: bool },
    Rejected,
    Failed,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            polls: AtomicUsize::new(0),
            polls_processed: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            rejected_submissions: AtomicUsize::new(0),
            failed_submissions: AtomicUsize::new(0),
            completion_warnings: AtomicUsize::new(0),
            defaulted_fetches: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            completions: AtomicUsize::new(0),
            total_fetch_time_us: AtomicU64::new(0),
            total_completion_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_poll(&self, status: AnalysisStatus) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        if status.is_terminal() {
            self.polls_processed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_submit(&self, outcome: SubmitOutcome) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        match outcome {
            SubmitOutcome::Accepted { warned: true } => {
                self.completion_warnings.fetch_add(1, Ordering::Relaxed);
            }
            SubmitOutcome::Accepted { warned: false } => {}
            SubmitOutcome::Rejected => {
                self.rejected_submissions.fetch_add(1, Ordering::Relaxed);
            }
            SubmitOutcome::Failed => {
                self.failed_submissions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// `defaulted` counts how many of the fetched parts fell back to defaults
    pub fn record_fetch(&self, duration: Duration, defaulted: usize) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.total_fetch_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.defaulted_fetches.fetch_add(defaulted, Ordering::Relaxed);
    }

    pub fn record_completion(&self, duration: Duration) {
        self.completions.fetch_add(1, Ordering::Relaxed);
        self.total_completion_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            polls_processed: self.polls_processed.load(Ordering::Relaxed),
            submissions: self.submissions.load(Ordering::Relaxed),
            rejected_submissions: self.rejected_submissions.load(Ordering::Relaxed),
            failed_submissions: self.failed_submissions.load(Ordering::Relaxed),
            completion_warnings: self.completion_warnings.load(Ordering::Relaxed),
            defaulted_fetches: self.defaulted_fetches.load(Ordering::Relaxed),
            avg_fetch_time_ms: avg_time_ms(
                &self.total_fetch_time_us,
                self.fetches.load(Ordering::Relaxed),
            ),
            avg_completion_time_ms: avg_time_ms(
                &self.total_completion_time_us,
                self.completions.load(Ordering::Relaxed),
            ),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub polls: usize,
    pub polls_processed: usize,
    pub submissions: usize,
    pub rejected_submissions: usize,
    pub failed_submissions: usize,
    pub completion_warnings: usize,
    pub defaulted_fetches: usize,
    pub avg_fetch_time_ms: f64,
    pub avg_completion_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.record_poll(AnalysisStatus::Processing);
        metrics.record_poll(AnalysisStatus::Processed);
        metrics.record_submit(SubmitOutcome::Rejected);
        metrics.record_submit(SubmitOutcome::Accepted { warned: true });
        metrics.record_fetch(Duration::from_millis(40), 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.polls, 2);
        assert_eq!(snapshot.polls_processed, 1);
        assert_eq!(snapshot.submissions, 2);
        assert_eq!(snapshot.rejected_submissions, 1);
        assert_eq!(snapshot.completion_warnings, 1);
        assert_eq!(snapshot.defaulted_fetches, 1);
        assert!((snapshot.avg_fetch_time_ms - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_fetch_average_ignores_submissions_without_fetch() {
        let metrics = Metrics::new();
        metrics.record_fetch(Duration::from_millis(100), 0);
        metrics.record_submit(SubmitOutcome::Accepted { warned: false });
        for _ in 0..9 {
            metrics.record_submit(SubmitOutcome::Failed);
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failed_submissions, 9);
        assert!((snapshot.avg_fetch_time_ms - 100.0).abs() < 1e-6);
        assert_eq!(snapshot.avg_completion_time_ms, 0.0);
    }
}
