//! HTTP client for the external matchmaking service.
//!
//! One POST per run, no retries: any transport error, non-2xx status or non-JSON body
//! fails the run and is surfaced to the operator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::matching::request_builder::MatchRequest;
use crate::matching::MatchError;

/// The outbound matchmaking call. `AppState` carries an `Arc<dyn Matchmaker>`.
#[async_trait]
pub trait Matchmaker: Send + Sync {
    /// Submits a request and returns the decoded, not yet normalized, response body.
    async fn submit(&self, request: &MatchRequest) -> Result<Value, MatchError>;
}

#[derive(Clone)]
pub struct MatchClient {
    client: Client,
    endpoint: String,
}

impl MatchClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, MatchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Matchmaker for MatchClient {
    async fn submit(&self, request: &MatchRequest) -> Result<Value, MatchError> {
        debug!(
            "Submitting {} postings and {} profiles to {}",
            request.postings.len(),
            request.profiles.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Matchmaking service returned {}: {}", status, body);
            return Err(MatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
