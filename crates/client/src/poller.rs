use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, warn};

use gutenberg::BookMetadata;
use synth::AnalysisResponse;

use crate::api_client::AnalysisApi;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const SUBMIT_ERROR: &str = "Failed to submit book";
pub const POLL_ERROR: &str = "Failed to get analysis results";

/// What a viewer of the tracked book sees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    pub book_id: Option<String>,
    pub analysis: Option<AnalysisResponse>,
    pub metadata: Option<BookMetadata>,
    pub error: Option<String>,
    pub is_loading: bool,
}

/// Submits a book and polls its analysis until it is processed.
///
/// At most one poll loop runs per tracker. Tracking another book, tracking
/// `None` or dropping the tracker cancels the running loop.
pub struct BookTracker {
    api: Arc<dyn AnalysisApi>,
    interval: Duration,
    state: Arc<watch::Sender<PollState>>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl BookTracker {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: Arc<dyn AnalysisApi>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollState::default());
        Self {
            api,
            interval,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Switch to `book_id`. All state is reset; blank ids only reset.
    pub fn track(&mut self, book_id: Option<&str>) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let book_id = book_id.map(str::trim).filter(|id| !id.is_empty());
        self.state.send_replace(PollState {
            book_id: book_id.map(str::to_string),
            ..PollState::default()
        });

        let Some(book_id) = book_id else {
            return;
        };

        let poll = PollLoop {
            api: self.api.clone(),
            book_id: book_id.to_string(),
            interval: self.interval,
            state: self.state.clone(),
            generation: self.generation.clone(),
            own_generation: generation,
        };
        self.task = Some(tokio::spawn(poll.run()));
    }

    /// Resolves once the current loop has stopped
    pub async fn wait_until_settled(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Poll loop ended abnormally");
                }
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for BookTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct PollLoop {
    api: Arc<dyn AnalysisApi>,
    book_id: String,
    interval: Duration,
    state: Arc<watch::Sender<PollState>>,
    generation: Arc<AtomicU64>,
    own_generation: u64,
}

impl PollLoop {
    /// Apply `update` unless a newer `track` call superseded this loop
    fn publish(&self, update: impl FnOnce(&mut PollState)) -> bool {
        if self.generation.load(Ordering::SeqCst) != self.own_generation {
            return false;
        }
        self.state.send_modify(update);
        true
    }

    async fn run(self) {
        self.publish(|state| {
            state.is_loading = true;
            state.error = None;
        });

        match self.api.submit_book(&self.book_id).await {
            Ok(job) => {
                debug!(book_id = %self.book_id, job_id = job.job_id, "Tracking analysis");
                if let Some(warning) = &job.warning {
                    warn!(book_id = %self.book_id, warning = %warning, "Submission warning");
                }
                self.publish(|state| {
                    state.metadata = Some(job.metadata);
                    state.is_loading = false;
                });
            }
            Err(e) => {
                warn!(book_id = %self.book_id, error = %format!("{:#}", e), "Submission failed");
                self.publish(|state| {
                    state.error = Some(SUBMIT_ERROR.to_string());
                    state.is_loading = false;
                });
                return;
            }
        }

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        loop {
            ticker.tick().await;

            match self.api.get_analysis(&self.book_id).await {
                Ok(analysis) => {
                    let done = analysis.status.is_terminal();
                    if !self.publish(|state| state.analysis = Some(analysis)) || done {
                        break;
                    }
                }
                Err(e) => {
                    warn!(book_id = %self.book_id, error = %format!("{:#}", e), "Poll failed");
                    self.publish(|state| state.error = Some(POLL_ERROR.to_string()));
                    break;
                }
            }
        }

        debug!(book_id = %self.book_id, "Poll loop stopped");
    }
}
