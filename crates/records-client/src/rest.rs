//! REST implementation of [`RecordSink`] against an Airtable-shaped API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tb_domain::config::RecordsConfig;
use tb_domain::error::{Error, Result};

use crate::sink::RecordSink;
use crate::types::{CreateRecordsRequest, InboundMessageRecord, ListRecordsResponse, RecordEnvelope};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the record sink.
#[derive(Debug, Clone)]
pub struct RestRecordsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    base_id: String,
    messages_table: String,
    member_table: String,
    max_retries: u32,
}

impl RestRecordsClient {
    /// Build a new client from the shared [`RecordsConfig`].
    ///
    /// `api_key` is resolved by the caller (config value or env var) and
    /// passed in explicitly so this crate stays environment-free.
    pub fn new(cfg: &RecordsConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            base_id: cfg.base_id.clone(),
            messages_table: cfg.messages_table.clone(),
            member_table: cfg.member_table.clone(),
            max_retries: cfg.max_retries,
        })
    }

    /// Build the full URL for a table.
    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, table)
    }

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.api_key {
            Some(ref key) => rb.bearer_auth(key),
            None => rb,
        }
    }

    /// Execute a request with retry + exponential back-off on transient
    /// errors (5xx / timeout).  4xx is permanent and never retried.
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

            match self.decorate(build_request()).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Records(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Records(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    tracing::debug!(endpoint, attempt, error = %e, "records call failed");
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Records(format!("{endpoint}: all retries exhausted"))))
    }
}

/// Convert a `reqwest::Error` into a domain `Error`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl RecordSink for RestRecordsClient {
    async fn append_message(&self, record: InboundMessageRecord) -> Result<()> {
        let url = self.table_url(&self.messages_table);
        let req = CreateRecordsRequest {
            records: vec![RecordEnvelope { fields: record }],
        };
        self.execute_with_retry("POST messages table", || self.http.post(&url).json(&req))
            .await?;
        Ok(())
    }

    async fn member_exists(&self, phone_number: &str) -> Result<bool> {
        let url = self.table_url(&self.member_table);
        // Formula-filtered lookup; one page is enough for an existence check.
        let formula = format!("{{PhoneNumber}} = '{phone_number}'");
        let resp = self
            .execute_with_retry("GET member table", || {
                self.http
                    .get(&url)
                    .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            })
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let list: ListRecordsResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Records(format!("failed to parse member response: {e}: {body}")))?;
        Ok(!list.records.is_empty())
    }
}
