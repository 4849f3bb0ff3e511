pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;

use anyhow::Result;
use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use analysis::{Analyzer, CompletionClient, OpenAiClient};
use gutenberg::{BookSource, GutenbergClient};
use synth::{RandomSource, SynthPolicy, SystemRandom};

pub use config::{AppConfig, OperationMode};
pub use error::{ApiError, ErrorBody};
pub use handlers::{COMPLETION_WARNING, JobResponse};
pub use metrics::Metrics;

pub struct AppState {
    pub books: Arc<dyn BookSource>,
    pub analyzer: Analyzer,
    pub policy: SynthPolicy,
    pub random: Mutex<Box<dyn RandomSource>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        books: Arc<dyn BookSource>,
        completions: Arc<dyn CompletionClient>,
        policy: SynthPolicy,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            books,
            analyzer: Analyzer::new(completions),
            policy,
            random: Mutex::new(random),
            metrics: Metrics::new(),
        }
    }

    /// Production wiring: Gutenberg mirror, OpenAI endpoint, real randomness
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let books = GutenbergClient::new(&config.gutenberg)?;
        let completions = OpenAiClient::new(&config.llm)?;

        Ok(Self::new(
            Arc::new(books),
            Arc::new(completions),
            config.synth.clone(),
            Box::new(SystemRandom::from_entropy()),
        ))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(AnyOrigin).allow_methods(AnyOrigin);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::get_metrics))
        .route(
            "/books/:book_id",
            get(handlers::get_analysis)
                .post(handlers::submit_book)
                .fallback(handlers::method_not_allowed),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown error".to_string()
    };

    ApiError::Internal(anyhow::anyhow!(detail)).into_response()
}
