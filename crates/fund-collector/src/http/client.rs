//! Async HTTP client wrapping reqwest.
//!
//! One request per call, no retry here; [`super::RetryingClient`] owns the
//! retry policy. The shared client keeps no cookies; [`Transport::new_session`]
//! hands out a client with its own cookie jar so a form-driven source can hold
//! a server-side session across requests.

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::types::{FundError, FundResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Default user agent sent to every source.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_ms: u64,
    user_agent: String,
    cookies: bool,
}

impl HttpClient {
    /// Create a stateless client with the given per-request timeout and user agent.
    pub fn new(timeout_ms: u64, user_agent: &str) -> FundResult<Self> {
        Self::build(timeout_ms, user_agent, false)
    }

    /// Whether responses' cookies are stored and replayed.
    pub fn keeps_cookies(&self) -> bool {
        self.cookies
    }

    fn build(timeout_ms: u64, user_agent: &str, cookies: bool) -> FundResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .cookie_store(cookies)
            .build()
            .map_err(|e| FundError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_ms,
            user_agent: user_agent.to_string(),
            cookies,
        })
    }

    fn transport_error(url: &str, e: reqwest::Error) -> FundError {
        FundError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &HttpRequest) -> FundResult<HttpResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(&request.params),
            Method::Post => self.client.post(&request.url).form(&request.params),
        };

        let resp = builder
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| Self::transport_error(&request.url, e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Self::transport_error(&request.url, e))?;

        Ok(HttpResponse { status, body })
    }

    fn new_session(&self) -> Arc<dyn Transport> {
        match HttpClient::build(self.timeout_ms, &self.user_agent, true) {
            Ok(fresh) => Arc::new(fresh),
            Err(e) => {
                tracing::warn!("could not open a fresh HTTP session, reusing client: {e}");
                Arc::new(self.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(10_000, DEFAULT_USER_AGENT).unwrap();
        assert!(!client.keeps_cookies());
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 304,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
