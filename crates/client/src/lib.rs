pub mod api_client;
pub mod poller;

pub use api_client::{AnalysisApi, ApiClient, JobResponse};
pub use poller::{BookTracker, DEFAULT_POLL_INTERVAL, POLL_ERROR, PollState, SUBMIT_ERROR};
