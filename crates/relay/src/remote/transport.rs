// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the remote unit API.
//!
//! [`Transport`] is the seam between the authentication logic in
//! [`RemoteClient`](super::RemoteClient) and the wire. [`HttpTransport`] talks
//! to the real service; tests substitute a scripted transport.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

/// HTTP methods used by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        };
        write!(f, "{s}")
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/units`.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Bearer token sent in the `Authorization` header.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        ApiRequest {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            bearer: None,
        }
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        ApiRequest {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Failures that prevented a response from arriving.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("http client error: {0}")]
    Client(String),
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Sends one request and returns the response, whatever its status.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> TransportResult<ApiResponse>;
}

/// Blocking reqwest transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Joins the base URL and a request path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> TransportResult<ApiResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        };
        builder = builder.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", request.method, url);
        let response = builder.send().map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(map_transport_error)?;
        Ok(ApiResponse { status, body })
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::ConnectionFailed(error.to_string())
    } else {
        TransportError::Client(error.to_string())
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
