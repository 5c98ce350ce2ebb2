//! Remote auth gateway
//!
//! [`AuthGateway`] is the seam between the session state machine and the
//! server. [`HttpAuthGateway`] implements it over HTTP/JSON:
//!
//! | operation | request |
//! |---|---|
//! | [`start`](AuthGateway::start) | `POST /auth/start` |
//! | [`verify`](AuthGateway::verify) | `POST /auth/verify` |
//! | [`register`](AuthGateway::register) | `POST /auth/register` |
//! | [`fetch_profile`](AuthGateway::fetch_profile) | `GET /users/me` |
//! | [`update_profile`](AuthGateway::update_profile) | `PATCH /users/me` |
//! | [`logout`](AuthGateway::logout) | `POST /auth/logout` |
//! | [`delete_account`](AuthGateway::delete_account) | `DELETE /users/me` |
//!
//! Non-success responses become [`AmityError::Gateway`] (or
//! [`AmityError::Unauthorized`] for 401) carrying the server's message;
//! transport failures become [`AmityError::Network`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::types::{
    AuthenticatedResponse, Profile, ProfileUpdate, RegisterRequest, StartRequest, StartResponse,
    VerifyRequest, VerifyResponse,
};
use crate::config::ApiConfig;
use crate::error::{AmityError, Result};

/// Server-side operations the session state machine depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Sends a one-time code to `email`.
    async fn start(&self, email: &str) -> Result<StartResponse>;

    /// Exchanges a code for a credential.
    async fn verify(&self, email: &str, code: &str) -> Result<VerifyResponse>;

    /// Creates the account for a verified new user.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthenticatedResponse>;

    /// Fetches the profile the credential belongs to.
    async fn fetch_profile(&self, token: &str) -> Result<Profile>;

    /// Applies a partial profile update and returns the result.
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Profile>;

    /// Tells the server the credential is no longer in use.
    async fn logout(&self, token: &str) -> Result<()>;

    /// Permanently deletes the account.
    async fn delete_account(&self, token: &str) -> Result<()>;
}

/// [`AuthGateway`] over HTTP/JSON.
///
/// # Examples
///
/// ```
/// use amity::auth::gateway::HttpAuthGateway;
/// use amity::config::ApiConfig;
///
/// let gateway = HttpAuthGateway::new(&ApiConfig::default());
/// assert!(gateway.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: Client,
    base_url: String,
}

impl HttpAuthGateway {
    /// Creates a gateway using the base URL, timeout, and user agent from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AmityError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized auth gateway: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, label: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!("Sending {} request", label);
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", label, e);
            AmityError::Network(format!("{} request failed: {}", label, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("{} returned {}", label, status);
        Err(error_from_response(status, &body).into())
    }

    async fn send_json<T: DeserializeOwned>(&self, label: &str, request: RequestBuilder) -> Result<T> {
        let response = self.send(label, request).await?;
        response.json::<T>().await.map_err(|e| {
            AmityError::Network(format!("Failed to parse {} response: {}", label, e)).into()
        })
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn start(&self, email: &str) -> Result<StartResponse> {
        let request = self
            .client
            .post(self.endpoint("auth/start"))
            .json(&StartRequest { email });
        self.send_json("auth/start", request).await
    }

    async fn verify(&self, email: &str, code: &str) -> Result<VerifyResponse> {
        let request = self
            .client
            .post(self.endpoint("auth/verify"))
            .json(&VerifyRequest { email, code });
        self.send_json("auth/verify", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthenticatedResponse> {
        let request = self
            .client
            .post(self.endpoint("auth/register"))
            .json(request);
        self.send_json("auth/register", request).await
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile> {
        let request = self.client.get(self.endpoint("users/me")).bearer_auth(token);
        self.send_json("users/me", request).await
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Profile> {
        let request = self
            .client
            .patch(self.endpoint("users/me"))
            .bearer_auth(token)
            .json(update);
        self.send_json("users/me update", request).await
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint("auth/logout"))
            .bearer_auth(token);
        self.send("auth/logout", request).await?;
        Ok(())
    }

    async fn delete_account(&self, token: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.endpoint("users/me"))
            .bearer_auth(token);
        self.send("users/me delete", request).await?;
        Ok(())
    }
}

/// Extracts the user-facing message from an error body.
///
/// Looks for `message`, then `error`, in a JSON object; falls back to the
/// raw body, then to the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.to_string();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

fn error_from_response(status: StatusCode, body: &str) -> AmityError {
    let message = error_message(status, body);
    if status == StatusCode::UNAUTHORIZED {
        AmityError::Unauthorized(message)
    } else {
        AmityError::Gateway {
            status: status.as_u16(),
            message,
        }
    }
}
