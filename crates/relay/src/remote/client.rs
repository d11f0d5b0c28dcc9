// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated client for the remote unit API.
//!
//! Tokens move through `none -> valid -> (401) -> none`. A rejected token
//! triggers one login and one retry of the same request; a second 401 is
//! reported as [`RemoteError::Unauthorized`].

use edp_core::{Unit, UnitUpdate};
use thiserror::Error;
use uuid::Uuid;

use super::dto::{CreateUnitRequest, TokenRequest, TokenResponse, UnitDto, UnitListResponse};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportError};
use super::UnitApi;
use crate::config::ApiConfig;

/// Re-authentications allowed per request after a 401.
pub const AUTH_RETRY_BUDGET: u32 = 1;

/// Errors from remote unit operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("remote rejected the credentials")]
    Unauthorized,

    #[error("read failed with HTTP {status}")]
    Read { status: u16 },

    #[error("write failed with HTTP {status}")]
    Write { status: u16 },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns true for failures worth retrying unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Read { status } | RemoteError::Write { status } => *status >= 500,
            RemoteError::Unauthorized | RemoteError::Decode(_) => false,
        }
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Login material for the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Static token used when no username and password are configured.
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn from_config(config: &ApiConfig) -> Self {
        Credentials {
            token: config.token.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn login(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

/// Client for the remote unit API.
pub struct RemoteClient<T: Transport = HttpTransport> {
    base_url: String,
    credentials: Credentials,
    transport: T,
    token: Option<String>,
}

impl RemoteClient<HttpTransport> {
    /// Build a client talking HTTP to `config.url`.
    pub fn new(config: &ApiConfig) -> RemoteResult<Self> {
        let transport = HttpTransport::new(&config.url, config.timeout)?;
        Ok(Self::with_transport(
            &config.url,
            Credentials::from_config(config),
            transport,
        ))
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn with_transport(base_url: &str, credentials: Credentials, transport: T) -> Self {
        RemoteClient {
            base_url: base_url.to_string(),
            credentials,
            transport,
            token: None,
        }
    }

    /// The currently held token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Obtain a token from the configured credentials.
    ///
    /// Logs and returns `None` instead of failing.
    pub fn authenticate(&self) -> Option<String> {
        let Some((username, password)) = self.credentials.login() else {
            if self.credentials.token.is_none() {
                tracing::warn!("no API credentials configured");
            }
            return self.credentials.token.clone();
        };

        let body = match serde_json::to_value(TokenRequest { username, password }) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("failed to encode login request: {e}");
                return None;
            }
        };
        let response = match self.transport.send(&ApiRequest::post("/token", body)) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("login failed: {e}");
                return None;
            }
        };
        if !response.is_success() {
            tracing::warn!("login rejected with HTTP {}", response.status);
            return None;
        }
        match serde_json::from_str::<TokenResponse>(&response.body) {
            Ok(parsed) => {
                tracing::info!("authenticated as {username}");
                Some(parsed.token)
            }
            Err(e) => {
                tracing::warn!("malformed login response: {e}");
                None
            }
        }
    }

    /// Check that the API is reachable and accepts our token.
    pub fn verify_connection(&mut self) -> bool {
        if self.base_url.trim().is_empty() {
            tracing::warn!("API URL is empty");
            return false;
        }
        if self.token.is_none() {
            self.token = self.authenticate();
        }
        let request = ApiRequest::get("/token").with_bearer(self.token.as_deref());
        match self.transport.send(&request) {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                if response.is_unauthorized() {
                    self.token = None;
                }
                tracing::warn!("connection check failed with HTTP {}", response.status);
                false
            }
            Err(e) => {
                tracing::warn!("connection check failed: {e}");
                false
            }
        }
    }

    /// Send `request` with the current token, re-authenticating on 401.
    fn send_authorized(&mut self, request: ApiRequest) -> RemoteResult<ApiResponse> {
        if self.token.is_none() {
            self.token = self.authenticate();
        }
        let mut budget = AUTH_RETRY_BUDGET;
        loop {
            let attempt = request.clone().with_bearer(self.token.as_deref());
            let response = self.transport.send(&attempt)?;
            if !response.is_unauthorized() {
                return Ok(response);
            }
            self.token = None;
            if budget == 0 {
                return Err(RemoteError::Unauthorized);
            }
            budget -= 1;
            tracing::info!(
                "token rejected on {} {}, re-authenticating",
                attempt.method,
                attempt.path
            );
            self.token = self.authenticate();
            if self.token.is_none() {
                return Err(RemoteError::Unauthorized);
            }
        }
    }
}

fn encode<S: serde::Serialize>(value: &S) -> RemoteResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| RemoteError::Decode(e.to_string()))
}

impl<T: Transport> UnitApi for RemoteClient<T> {
    fn list_units(&mut self) -> RemoteResult<Vec<Unit>> {
        let response = self.send_authorized(ApiRequest::get("/units"))?;
        if !response.is_success() {
            return Err(RemoteError::Read {
                status: response.status,
            });
        }
        let list: UnitListResponse = serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::Decode(format!("unit list: {e}")))?;
        Ok(list.into_units())
    }

    fn create_unit(&mut self, unit: &Unit) -> RemoteResult<Unit> {
        let body = encode(&CreateUnitRequest::from(unit))?;
        let response = self.send_authorized(ApiRequest::post("/units", body))?;
        if !response.is_success() {
            return Err(RemoteError::Write {
                status: response.status,
            });
        }
        let dto: UnitDto = serde_json::from_str(&response.body)
            .map_err(|e| RemoteError::Decode(format!("created unit: {e}")))?;
        if dto.id.is_none() {
            return Err(RemoteError::Decode(format!(
                "created unit '{}' has no id",
                dto.name
            )));
        }
        Ok(Unit::from(dto))
    }

    fn update_unit(&mut self, id: Uuid, update: &UnitUpdate) -> RemoteResult<()> {
        let body = encode(update)?;
        let response = self.send_authorized(ApiRequest::patch(format!("/units/{id}"), body))?;
        if !response.is_success() {
            return Err(RemoteError::Write {
                status: response.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
