//! GraphQL client
//!
//! Issues single-page requests against the gateway with a fixed retry
//! budget. Pages that exhaust their budget are recorded in an append-only
//! error-cursor log and reported as a definitive failure (`Ok(None)`),
//! which is distinct from an empty page.

mod retry;

pub use retry::{with_retries, RetryOutcome};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::HarvestConfig;
use crate::crawler::{CrawlOptions, Crawler};
use crate::error::{Error, Result};
use crate::query::{
    build_details_payload, build_summary_payload, Page, PageRequest, QueryType, TxEdge,
};

/// Seam between the query executor and the pagination driver.
///
/// `Ok(Some(page))` is a fetched page (possibly empty, which signals
/// exhaustion), `Ok(None)` means the retry budget ran out for this page,
/// and `Err` is reserved for validation failures that must surface to the
/// caller synchronously.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of transaction summaries
    async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>>;
}

/// Client for the gateway's transactions query
pub struct GraphqlClient {
    http: reqwest::Client,
    config: HarvestConfig,
}

impl GraphqlClient {
    /// Create a client from a configuration
    pub fn new(config: HarvestConfig) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
        );
        headers.insert(
            reqwest::header::ORIGIN,
            reqwest::header::HeaderValue::from_static("https://www.ao.link"),
        );
        headers.insert(
            reqwest::header::REFERER,
            reqwest::header::HeaderValue::from_static("https://www.ao.link/"),
        );
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(value)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .expect("failed to build HTTP client");

        Self { http, config }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// POST a GraphQL payload and parse the page out of the response.
    /// Each call is one independently fallible attempt.
    async fn post_payload(&self, payload: &Value) -> Result<Page> {
        let response = self
            .http
            .post(&self.config.graphql_endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        Page::from_response(&body)
    }

    /// Fetch all transaction summaries for an entity, driving the full
    /// checkpoint-resumable crawl. This is the main entry point; see
    /// [`CrawlOptions`] for the knobs.
    pub async fn get_all_transaction_summaries(
        &self,
        entity_id: &str,
        query_type: QueryType,
        options: CrawlOptions,
    ) -> Result<Vec<TxEdge>> {
        // Retry overrides live on the executor, so they need a client
        // carrying the adjusted budget.
        if options.max_retries.is_some() || options.retry_delay_secs.is_some() {
            let mut config = self.config.clone();
            if let Some(retries) = options.max_retries {
                config.max_retries = retries;
            }
            if let Some(delay) = options.retry_delay_secs {
                config.retry_delay_secs = delay;
            }
            let derived = GraphqlClient::new(config.clone());
            let mut crawler = Crawler::new(&derived, config, options);
            return crawler.run(entity_id, query_type).await;
        }
        let mut crawler = Crawler::new(self, self.config.clone(), options);
        crawler.run(entity_id, query_type).await
    }

    /// Fetch one page of message details: results pushed for `message_id`
    /// by `from_process_id`. Retried within the same budget as summaries.
    pub async fn get_transaction_details(
        &self,
        message_id: &str,
        from_process_id: &str,
        limit: usize,
        cursor: &str,
        want_count: bool,
    ) -> Result<Option<Page>> {
        let payload = build_details_payload(message_id, from_process_id, limit, cursor, want_count);
        self.fetch_with_budget(&payload, cursor).await
    }

    /// Run one payload through the retry budget; on exhaustion, record the
    /// cursor and demote to `None`.
    async fn fetch_with_budget(&self, payload: &Value, cursor: &str) -> Result<Option<Page>> {
        let outcome = with_retries(self.config.max_retries, self.config.retry_delay(), || {
            self.post_payload(payload)
        })
        .await;

        match outcome {
            RetryOutcome::Success(page) => {
                debug!("fetched page with {} records", page.len());
                Ok(Some(page))
            }
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                error!("giving up on cursor {cursor:?} after {attempts} attempts: {last_error}");
                self.log_error_cursor(cursor).await;
                Ok(None)
            }
        }
    }

    /// Append the failing cursor to the error log, one cursor per line.
    /// Log failures are themselves non-fatal.
    async fn log_error_cursor(&self, cursor: &str) {
        use tokio::io::AsyncWriteExt;

        let open = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.error_log_path)
            .await;

        match open {
            Ok(mut file) => {
                let write = async {
                    file.write_all(format!("{cursor}\n").as_bytes()).await?;
                    // tokio::fs::File buffers internally; without a flush the
                    // write may still be pending when this function returns.
                    file.flush().await
                };
                if let Err(e) = write.await {
                    error!("failed to write error cursor log: {e}");
                } else {
                    info!("cursor {cursor:?} saved to {}", self.config.error_log_path);
                }
            }
            Err(e) => error!(
                "failed to open error cursor log {}: {e}",
                self.config.error_log_path
            ),
        }
    }
}

#[async_trait]
impl PageFetcher for GraphqlClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>> {
        // Range validation surfaces synchronously; it is never retried.
        let payload = build_summary_payload(request)?;
        self.fetch_with_budget(&payload, &request.cursor).await
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.config.graphql_endpoint)
            .field("max_retries", &self.config.max_retries)
            .finish_non_exhaustive()
    }
}
