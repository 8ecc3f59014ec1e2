//! Bounded, fixed-delay retry around a [`Transport`].

use super::{HttpRequest, Transport};
use crate::types::{FundError, FundResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fixed attempt count and fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(rename = "delay_ms", with = "duration_ms")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Attempt count, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// HTTP client that applies a [`RetryPolicy`] to every request.
///
/// Transport errors, non-2xx statuses and (for [`RetryingClient::request_json`])
/// undecodable bodies all count as failed attempts. After the last attempt
/// the last error is returned.
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// A client over a fresh transport session, same policy.
    pub fn session(&self) -> Self {
        Self {
            transport: self.transport.new_session(),
            policy: self.policy,
        }
    }

    /// Fetch the body as text.
    pub async fn request(&self, request: &HttpRequest) -> FundResult<String> {
        self.request_with(request, |body| Ok(body.to_string())).await
    }

    /// Fetch and decode the body as JSON.
    pub async fn request_json(&self, request: &HttpRequest) -> FundResult<Value> {
        self.request_with(request, |body| {
            serde_json::from_str(body).map_err(|e| FundError::Decode {
                url: request.url.clone(),
                message: e.to_string(),
            })
        })
        .await
    }

    async fn request_with<T, F>(&self, request: &HttpRequest, parse: F) -> FundResult<T>
    where
        F: Fn(&str) -> FundResult<T>,
    {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            tracing::debug!(
                "{:?} {} params={:?} (attempt {attempt}/{attempts})",
                request.method,
                request.url,
                request.params
            );

            let outcome = match self.transport.send(request).await {
                Ok(resp) if resp.is_success() => parse(&resp.body),
                Ok(resp) => Err(FundError::Status {
                    url: request.url.clone(),
                    status: resp.status,
                }),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!("attempt {attempt}/{attempts} failed: {e}; retrying");
                    attempt += 1;
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
