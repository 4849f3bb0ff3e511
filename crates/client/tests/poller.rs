use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use client::{AnalysisApi, BookTracker, JobResponse, POLL_ERROR, SUBMIT_ERROR};
use gutenberg::BookMetadata;
use synth::{AnalysisResponse, AnalysisStatus};

/// Replies with scripted poll results; once the script runs out every poll
/// answers `processing`
#[derive(Default)]
struct ScriptedApi {
    submit_fails: bool,
    submit_delay: Duration,
    script: Mutex<VecDeque<Option<AnalysisStatus>>>,
    polls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedApi {
    fn new(script: impl IntoIterator<Item = Option<AnalysisStatus>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }

    fn failing_submit() -> Arc<Self> {
        Arc::new(Self {
            submit_fails: true,
            ..Self::default()
        })
    }

    fn polls_for(&self, book_id: &str) -> Vec<Instant> {
        self.polls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == book_id)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn submit_book(&self, book_id: &str) -> Result<JobResponse> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        if self.submit_fails {
            anyhow::bail!("Submission failed: 404 Not Found");
        }
        Ok(JobResponse {
            job_id: 1,
            metadata: BookMetadata::fallback(book_id.parse().unwrap_or(0)),
            warning: None,
        })
    }

    async fn get_analysis(&self, book_id: &str) -> Result<AnalysisResponse> {
        self.polls
            .lock()
            .unwrap()
            .push((book_id.to_string(), Instant::now()));

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Some(AnalysisStatus::Processing));

        match next {
            Some(status) => Ok(AnalysisResponse {
                status,
                graph: None,
                quotes: Vec::new(),
            }),
            None => anyhow::bail!("Analysis request failed: 500 Internal Server Error"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_processed() {
    let api = ScriptedApi::new([
        Some(AnalysisStatus::Processing),
        Some(AnalysisStatus::Processing),
        Some(AnalysisStatus::Processed),
    ]);
    let mut tracker = BookTracker::new(api.clone());
    let started = Instant::now();

    tracker.track(Some("1342"));
    tracker.wait_until_settled().await;

    let state = tracker.state();
    assert_eq!(state.book_id.as_deref(), Some("1342"));
    assert_eq!(state.metadata.unwrap().title, "Book #1342");
    assert_eq!(state.analysis.unwrap().status, AnalysisStatus::Processed);
    assert_eq!(state.error, None);
    assert!(!state.is_loading);

    let offsets: Vec<Duration> = api
        .polls_for("1342")
        .into_iter()
        .map(|at| at - started)
        .collect();
    assert_eq!(
        offsets,
        vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(6)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_stops_before_polling() {
    let api = ScriptedApi::failing_submit();
    let mut tracker = BookTracker::new(api.clone());

    tracker.track(Some("5"));
    tracker.wait_until_settled().await;

    let state = tracker.state();
    assert_eq!(state.error.as_deref(), Some(SUBMIT_ERROR));
    assert!(state.metadata.is_none());
    assert!(!state.is_loading);
    assert!(api.polls_for("5").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_keeps_metadata() {
    let api = ScriptedApi::new([Some(AnalysisStatus::Processing), None]);
    let mut tracker = BookTracker::new(api.clone());

    tracker.track(Some("11"));
    tracker.wait_until_settled().await;

    let state = tracker.state();
    assert_eq!(state.error.as_deref(), Some(POLL_ERROR));
    assert!(state.metadata.is_some());
    assert_eq!(state.analysis.unwrap().status, AnalysisStatus::Processing);
    assert_eq!(api.polls_for("11").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_switching_books_cancels_previous_loop() {
    let api = ScriptedApi::new([]);
    let mut tracker = BookTracker::with_interval(api.clone(), Duration::from_millis(500));

    tracker.track(Some("1"));
    tokio::time::sleep(Duration::from_millis(1600)).await;
    let polls_before_switch = api.polls_for("1").len();
    assert_eq!(polls_before_switch, 3);

    tracker.track(Some("2"));
    let state = tracker.state();
    assert_eq!(state.book_id.as_deref(), Some("2"));
    assert!(state.analysis.is_none());
    assert!(state.metadata.is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(api.polls_for("1").len(), polls_before_switch);
    assert!(!api.polls_for("2").is_empty());
    assert_eq!(tracker.state().metadata.unwrap().title, "Book #2");
}

#[tokio::test(start_paused = true)]
async fn test_blank_id_only_resets() {
    let api = ScriptedApi::new([]);
    let mut tracker = BookTracker::new(api.clone());

    tracker.track(Some("7"));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(tracker.state().analysis.is_some());

    tracker.track(Some("   "));
    tracker.wait_until_settled().await;

    let state = tracker.state();
    assert_eq!(state.book_id, None);
    assert!(state.analysis.is_none());
    assert!(!state.is_loading);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(api.polls_for("7").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_loading_then_metadata() {
    let api = Arc::new(ScriptedApi {
        submit_delay: Duration::from_secs(1),
        script: Mutex::new(VecDeque::from([Some(AnalysisStatus::Processed)])),
        ..ScriptedApi::default()
    });
    let mut tracker = BookTracker::new(api);
    let mut updates = tracker.subscribe();
    let started = Instant::now();

    tracker.track(Some("84"));

    let loading = updates.wait_for(|state| state.is_loading).await.unwrap().clone();
    assert_eq!(loading.book_id.as_deref(), Some("84"));
    assert!(loading.metadata.is_none());
    assert!(started.elapsed() < Duration::from_secs(1));

    let submitted = updates
        .wait_for(|state| state.metadata.is_some())
        .await
        .unwrap()
        .clone();
    assert!(!submitted.is_loading);
    assert!(submitted.analysis.is_none());
    assert_eq!(started.elapsed(), Duration::from_secs(1));

    tracker.wait_until_settled().await;
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.analysis.unwrap().status, AnalysisStatus::Processed);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}
