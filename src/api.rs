//! Homework review API client.
//!
//! [`HomeworkApi`] is the seam the poll loop depends on; [`PracticumClient`]
//! is the reqwest implementation used in production.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{PollError, RequestContext};

/// Source of homework status snapshots.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch statuses changed since `from_date` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Transport`], [`PollError::BadEndpoint`] or
    /// [`PollError::MalformedResponse`].
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}

/// reqwest-backed client for the homework statuses endpoint.
#[derive(Clone)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    /// Create a client for the configured endpoint and token.
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config.endpoint.clone(), config.practicum_token.clone())
    }

    /// Create a client for an explicit endpoint.
    pub fn with_endpoint(endpoint: String, token: String) -> Self {
        Self {
            endpoint,
            token,
            client: reqwest::Client::new(),
        }
    }

    fn context(&self, from_date: i64) -> RequestContext {
        RequestContext {
            url: self.endpoint.clone(),
            headers: vec![(
                AUTHORIZATION.as_str().to_owned(),
                "OAuth [REDACTED]".to_owned(),
            )],
            params: vec![("from_date".to_owned(), from_date.to_string())],
        }
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        debug!(endpoint = %self.endpoint, from_date, "requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| PollError::Transport {
                message: transport_message(e),
                context: self.context(from_date),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollError::BadEndpoint {
                status: status.as_u16(),
                context: self.context(from_date),
            });
        }

        let body = response.text().await.map_err(|e| PollError::Transport {
            message: transport_message(e),
            context: self.context(from_date),
        })?;

        serde_json::from_str(&body).map_err(|e| PollError::MalformedResponse(e.to_string()))
    }
}

/// Full cause chain, e.g. `error sending request: ... : Connection refused`.
///
/// reqwest's own `Display` stops at the outermost error.
fn transport_message(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::from(e.without_url()))
}
