use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, TextCache};
use crate::cleaner::clean_book_text;
use crate::fetched::Fetched;
use crate::metadata::{BookMetadata, parse_metadata};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GutenbergConfig {
    pub mirror_base: String,
    pub request_timeout_secs: u64,
    pub cache_max_entries: usize,
    pub cache_ttl_secs: u64,
}

impl Default for GutenbergConfig {
    fn default() -> Self {
        Self {
            mirror_base: "https://www.gutenberg.org".to_string(),
            request_timeout_secs: 30,
            cache_max_entries: 64,
            cache_ttl_secs: 6 * 60 * 60,
        }
    }
}

/// Where the request handler gets books from
#[async_trait]
pub trait BookSource: Send + Sync {
    async fn metadata(&self, book_id: u32) -> Result<Fetched<BookMetadata>>;

    /// Cleaned book text; an empty value means the text is unavailable
    async fn text(&self, book_id: u32) -> Result<Fetched<String>>;

    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

pub struct GutenbergClient {
    mirror_base: String,
    client: reqwest::Client,
    cache: TextCache,
}

impl GutenbergClient {
    pub fn new(config: &GutenbergConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build Gutenberg HTTP client")?;

        Ok(Self {
            mirror_base: config.mirror_base.trim_end_matches('/').to_string(),
            client,
            cache: TextCache::new(
                config.cache_max_entries,
                Duration::from_secs(config.cache_ttl_secs),
            ),
        })
    }

    /// Mirror URLs for a book's plain text, in the order they are tried
    pub fn text_urls(&self, book_id: u32) -> [String; 4] {
        let base = &self.mirror_base;
        [
            format!("{base}/files/{book_id}/{book_id}-0.txt"),
            format!("{base}/files/{book_id}/{book_id}.txt"),
            format!("{base}/ebooks/{book_id}.txt.utf-8"),
            format!("{base}/files/{book_id}/pg{book_id}.txt"),
        ]
    }

    pub fn metadata_url(&self, book_id: u32) -> String {
        format!(
            "{}/cache/epub/{book_id}/pg{book_id}.rdf",
            self.mirror_base
        )
    }

    /// Raw book text from the first mirror pattern that answers with success.
    /// Never fails: when every pattern fails the value is an empty string.
    pub async fn download_book(&self, book_id: u32) -> Fetched<String> {
        if let Some(text) = self.cache.get(book_id) {
            debug!(book_id, "Book text served from cache");
            return Fetched::Extracted(text.to_string());
        }

        match self.try_download_patterns(book_id).await {
            Ok(text) => {
                if !text.is_empty() {
                    self.cache.insert(book_id, Arc::from(text.as_str()));
                }
                Fetched::Extracted(text)
            }
            Err(e) => {
                warn!(book_id, error = %e, "Book text unavailable");
                Fetched::defaulted(String::new(), e.to_string())
            }
        }
    }

    async fn try_download_patterns(&self, book_id: u32) -> Result<String> {
        for url in self.text_urls(book_id) {
            match self.fetch_text(&url).await {
                Ok(text) => {
                    info!(book_id, url = %url, bytes = text.len(), "Downloaded book text");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(book_id, url = %url, error = %e, "Failed to download from mirror");
                }
            }
        }

        anyhow::bail!("Failed to download book {} from any source", book_id)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach mirror")?;

        if !response.status().is_success() {
            anyhow::bail!("Mirror responded with {}", response.status());
        }

        response.text().await.context("Failed to read mirror body")
    }

    /// Downloaded and cleaned book text
    pub async fn get_book(&self, book_id: u32) -> Fetched<String> {
        self.download_book(book_id)
            .await
            .map(|raw| clean_book_text(&raw))
    }

    /// Bibliographic record for a book. Never fails: any fetch problem
    /// yields [`BookMetadata::fallback`].
    pub async fn get_metadata(&self, book_id: u32) -> Fetched<BookMetadata> {
        let url = self.metadata_url(book_id);

        match self.fetch_text(&url).await {
            Ok(rdf) => Fetched::Extracted(parse_metadata(book_id, &rdf)),
            Err(e) => {
                warn!(book_id, url = %url, error = %e, "Metadata unavailable, using defaults");
                Fetched::defaulted(BookMetadata::fallback(book_id), e.to_string())
            }
        }
    }

    /// Text and metadata fetched concurrently
    pub async fn get_book_with_metadata(
        &self,
        book_id: u32,
    ) -> (Fetched<String>, Fetched<BookMetadata>) {
        tokio::join!(self.get_book(book_id), self.get_metadata(book_id))
    }

    pub fn text_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl BookSource for GutenbergClient {
    async fn metadata(&self, book_id: u32) -> Result<Fetched<BookMetadata>> {
        Ok(self.get_metadata(book_id).await)
    }

    async fn text(&self, book_id: u32) -> Result<Fetched<String>> {
        Ok(self.get_book(book_id).await)
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.text_cache_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GutenbergClient {
        GutenbergClient::new(&GutenbergConfig {
            mirror_base: server.uri(),
            request_timeout_secs: 5,
            ..GutenbergConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_patterns_in_order() {
        let client = GutenbergClient::new(&GutenbergConfig {
            mirror_base: "https://mirror.test/".to_string(),
            ..GutenbergConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.text_urls(11),
            [
                "https://mirror.test/files/11/11-0.txt".to_string(),
                "https://mirror.test/files/11/11.txt".to_string(),
                "https://mirror.test/ebooks/11.txt.utf-8".to_string(),
                "https://mirror.test/files/11/pg11.txt".to_string(),
            ]
        );
        assert_eq!(
            client.metadata_url(11),
            "https://mirror.test/cache/epub/11/pg11.rdf"
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_later_pattern() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ebooks/98.txt.utf-8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "*** START OF THE PROJECT GUTENBERG EBOOK ***\nIt was the best of times\n*** END OF THE PROJECT GUTENBERG EBOOK ***",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let book = client.get_book(98).await;

        assert_eq!(book, Fetched::Extracted("It was the best of times".to_string()));
    }

    #[tokio::test]
    async fn test_all_patterns_failing_yields_empty_text() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let book = client.download_book(5).await;

        assert!(book.is_defaulted());
        assert_eq!(book.value(), "");
        assert_eq!(client.text_cache_stats().texts_cached, 0);
    }

    #[tokio::test]
    async fn test_second_download_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/1342/1342-0.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Pride"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.download_book(1342).await.into_inner(), "Pride");
        assert_eq!(client.download_book(1342).await.into_inner(), "Pride");
        assert_eq!(client.text_cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_metadata_defaults_on_missing_record() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let metadata = client.get_metadata(77).await;

        assert!(metadata.is_defaulted());
        assert_eq!(metadata.into_inner(), BookMetadata::fallback(77));
    }

    #[tokio::test]
    async fn test_metadata_from_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cache/epub/158/pg158.rdf"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<dcterms:title>Emma</dcterms:title><pgterms:name>Austen, Jane</pgterms:name>",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let metadata = client.get_metadata(158).await;

        assert!(!metadata.is_defaulted());
        let metadata = metadata.into_inner();
        assert_eq!(metadata.title, "Emma");
        assert_eq!(metadata.author, "Austen, Jane");
        assert_eq!(metadata.language, "en");
    }
}
