use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use gutenberg::{BookMetadata, CacheStats};
use synth::{AnalysisResponse, RandomSource};

use crate::AppState;
use crate::error::ApiError;
use crate::metrics::{MetricsSnapshot, SubmitOutcome, TimedOperation};

pub const COMPLETION_WARNING: &str = "Analysis started but may be delayed";

/// Exclusive upper bound of job ids
const JOB_ID_RANGE: usize = 1_000_000;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: u32,
    pub metadata: BookMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    requests: MetricsSnapshot,
    text_cache: Option<CacheStats>,
}

/// Leading integer of `raw` after leading whitespace: `"12abc"` and `"12.7"`
/// both name book 12. No leading digit, or a value past `u32`, is rejected.
pub fn parse_book_id(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let digits = raw
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw, |end| &raw[..end]);
    digits.parse().ok()
}

/// Status poll. The book id in the path is not consulted.
pub async fn get_analysis(State(state): State<Arc<AppState>>) -> Json<AnalysisResponse> {
    let response = {
        let mut rng = state.random.lock().await;
        synth::poll_response(&mut **rng, &state.policy)
    };

    state.metrics.record_poll(response.status);
    debug!(
        status = ?response.status,
        nodes = response.graph.as_ref().map(|g| g.nodes.len()).unwrap_or(0),
        quotes = response.quotes.len(),
        "Answered analysis poll"
    );

    Json(response)
}

/// Book submission: fetch metadata and text, start the analysis call
pub async fn submit_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let Some(book_id) = parse_book_id(&raw_id) else {
        state.metrics.record_submit(SubmitOutcome::Rejected);
        return Err(ApiError::InvalidBookId(raw_id));
    };

    let timer = TimedOperation::start();
    let fetched = tokio::try_join!(state.books.metadata(book_id), state.books.text(book_id));
    let (metadata, text) = match fetched {
        Ok(parts) => parts,
        Err(e) => {
            state.metrics.record_fetch(timer.elapsed(), 0);
            state.metrics.record_submit(SubmitOutcome::Failed);
            return Err(ApiError::BookNotFound(e));
        }
    };

    let defaulted = usize::from(metadata.is_defaulted()) + usize::from(text.is_defaulted());
    state.metrics.record_fetch(timer.elapsed(), defaulted);

    let metadata = metadata.into_inner();
    let text = text.into_inner();

    let timer = TimedOperation::start();
    let warning = match state.analyzer.start(&metadata.title, &metadata.author, &text).await {
        Ok(()) => None,
        Err(e) => {
            warn!(book_id, error = %format!("{:#}", e), "Completion request failed");
            Some(COMPLETION_WARNING.to_string())
        }
    };
    state.metrics.record_completion(timer.elapsed());

    let job_id = {
        let mut rng = state.random.lock().await;
        rng.below(JOB_ID_RANGE) as u32
    };

    state.metrics.record_submit(SubmitOutcome::Accepted {
        warned: warning.is_some(),
    });
    info!(
        book_id,
        job_id,
        title = %metadata.title,
        text_chars = text.len(),
        warned = warning.is_some(),
        "Book submitted"
    );

    Ok(Json(JobResponse {
        job_id,
        metadata,
        warning,
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        requests: state.metrics.snapshot(),
        text_cache: state.books.cache_stats(),
    })
}
