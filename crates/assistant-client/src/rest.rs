//! REST implementation of [`AssistantBackend`].
//!
//! `RestAssistantClient` wraps a `reqwest::Client` and translates every
//! trait method into the corresponding HTTP call against the hosted
//! assistant API, with automatic retry + exponential back-off on transient
//! (5xx / timeout) failures.  The bridge runtime above this client never
//! retries; transport-level retry lives here and only here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tb_domain::config::AssistantConfig;
use tb_domain::error::{Error, Result};
use uuid::Uuid;

use crate::backend::AssistantBackend;
use crate::types::{
    AppendMessageRequest, MessageList, RunObject, RunStatus, StartRunRequest, ThreadCreated,
    ThreadMessage,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the assistant backend.
///
/// Created once and reused for the lifetime of the bridge process.  The
/// underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestAssistantClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RestAssistantClient {
    /// Build a new client from the shared [`AssistantConfig`].
    ///
    /// `api_key` is resolved by the caller (config value or env var) and
    /// passed in explicitly so this crate stays environment-free.
    pub fn new(cfg: &AssistantConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("OpenAI-Beta", "assistants=v2")
            .header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.bearer_auth(key);
        }
        rb
    }

    /// Build the full URL for a path like `/threads/{id}/runs`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let rb = self.decorate(build_request());
            match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Backend(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Backend(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, attempt, error = %e, "assistant call failed");
                    last_err = Some(from_reqwest(e));
                    // Timeouts and connection errors are transient — retry
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Backend(format!("{endpoint}: all retries exhausted"))))
    }

    /// Read and parse a JSON response body.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: Response,
    ) -> Result<T> {
        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Backend(format!("failed to parse {endpoint} response: {e}: {body}")))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl AssistantBackend for RestAssistantClient {
    async fn create_conversation(&self) -> Result<String> {
        let url = self.url("/threads");
        let resp = self
            .execute_with_retry("POST /threads", || {
                self.http.post(&url).json(&serde_json::json!({}))
            })
            .await?;

        let thread: ThreadCreated = Self::parse_json("POST /threads", resp).await?;
        Ok(thread.id)
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let url = self.url(&format!("/threads/{thread_id}/messages"));
        let req = AppendMessageRequest {
            role: "user",
            content: text,
        };
        self.execute_with_retry("POST /threads/{id}/messages", || {
            self.http.post(&url).json(&req)
        })
        .await?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String> {
        let url = self.url(&format!("/threads/{thread_id}/runs"));
        let req = StartRunRequest { assistant_id };
        let resp = self
            .execute_with_retry("POST /threads/{id}/runs", || self.http.post(&url).json(&req))
            .await?;

        let run: RunObject = Self::parse_json("POST /threads/{id}/runs", resp).await?;
        Ok(run.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus> {
        let url = self.url(&format!("/threads/{thread_id}/runs/{run_id}"));
        let resp = self
            .execute_with_retry("GET /threads/{id}/runs/{rid}", || self.http.get(&url))
            .await?;

        let run: RunObject = Self::parse_json("GET /threads/{id}/runs/{rid}", resp).await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let url = self.url(&format!("/threads/{thread_id}/messages"));
        let resp = self
            .execute_with_retry("GET /threads/{id}/messages", || self.http.get(&url))
            .await?;

        let list: MessageList = Self::parse_json("GET /threads/{id}/messages", resp).await?;
        Ok(list.data)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let cfg = AssistantConfig {
            base_url: "https://api.example.com/v1/".into(),
            ..AssistantConfig::default()
        };
        let client = RestAssistantClient::new(&cfg, None).unwrap();
        assert_eq!(client.url("/threads"), "https://api.example.com/v1/threads");
    }
}
