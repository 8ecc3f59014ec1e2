//! HTTP plumbing: the transport seam, the reqwest client and the retry wrapper.

pub mod client;
pub mod retry;

pub use client::HttpClient;
pub use retry::{RetryPolicy, RetryingClient};

use crate::types::FundResult;
use async_trait::async_trait;
use std::sync::Arc;

/// HTTP method used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request against an upstream endpoint.
///
/// For `Get` the params become the query string; for `Post` they are sent
/// as a url-encoded form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Replace all parameters.
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// First value for `name`, if any.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One round trip to the network. No retries at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response.
    ///
    /// Only transport-level failures are errors; any status code is `Ok`.
    async fn send(&self, request: &HttpRequest) -> FundResult<HttpResponse>;

    /// A transport with its own session state (cookie jar).
    fn new_session(&self) -> Arc<dyn Transport>;
}
