//! Outbound chat transport — how replies reach the chat connector.
//!
//! The bridge never speaks the chat protocol itself; a connector process
//! owns the device session and exposes a small HTTP send endpoint.  The
//! [`ChatTransport`] trait keeps the runtime testable with an in-memory
//! fake.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use tb_domain::config::ConnectorConfig;
use tb_domain::error::{Error, Result};

/// Delivers replies to chat recipients.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` to `recipient`.  `recipient` is the bare chat identity,
    /// without any channel suffix.
    async fn reply(&self, recipient: &str, text: &str) -> Result<()>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: &'a str,
    text: &'a str,
}

/// HTTP transport that posts replies to the connector's send endpoint.
pub struct RestConnectorTransport {
    http: reqwest::Client,
    send_url: String,
}

impl RestConnectorTransport {
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Connector(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            send_url: config.send_url.clone(),
        })
    }
}

#[async_trait]
impl ChatTransport for RestConnectorTransport {
    async fn reply(&self, recipient: &str, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(&self.send_url)
            .header("X-Trace-Id", uuid::Uuid::new_v4().to_string())
            .json(&SendRequest { recipient, text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("connector send: {e}"))
                } else {
                    Error::Connector(format!("connector send: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Connector(format!(
                "connector send returned {status}: {body}"
            )));
        }

        Ok(())
    }
}
