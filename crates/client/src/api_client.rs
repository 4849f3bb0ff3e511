use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use gutenberg::BookMetadata;
use synth::AnalysisResponse;

/// Answer to a book submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: u32,
    pub metadata: BookMetadata,
    #[serde(default)]
    pub warning: Option<String>,
}

/// The two calls the poller makes against the analysis service
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn submit_book(&self, book_id: &str) -> Result<JobResponse>;
    async fn get_analysis(&self, book_id: &str) -> Result<AnalysisResponse>;
}

pub struct ApiClient {
    api_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build API HTTP client")?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn book_url(&self, book_id: &str) -> String {
        format!("{}/books/{}", self.api_url, book_id)
    }
}

#[async_trait]
impl AnalysisApi for ApiClient {
    async fn submit_book(&self, book_id: &str) -> Result<JobResponse> {
        let response = self
            .client
            .post(self.book_url(book_id))
            .send()
            .await
            .context("Failed to reach analysis service")?;

        if !response.status().is_success() {
            anyhow::bail!("Submission failed: {}", response.status());
        }

        let job: JobResponse = response
            .json()
            .await
            .context("Failed to parse submission response")?;
        debug!(book_id, job_id = job.job_id, "Book submitted");
        Ok(job)
    }

    async fn get_analysis(&self, book_id: &str) -> Result<AnalysisResponse> {
        let response = self
            .client
            .get(self.book_url(book_id))
            .send()
            .await
            .context("Failed to reach analysis service")?;

        if !response.status().is_success() {
            anyhow::bail!("Analysis request failed: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse analysis response")
    }
}
