//! HTTPS/JSON backend for the EatsEase profile service
//!
//! All authenticated calls funnel through `execute`, which is the only place
//! that recognizes session expiry (HTTP 401 or a `{"token": "Token Expired"}` body).

use super::ProfileService;
use crate::error::{Result, SwipeError};
use async_trait::async_trait;
use eatsease_common::{AuthoritativeCount, CandidateCard, CurrentLikedDto, MenuItemDto};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://eatsease-backend-1jbu.onrender.com/api/";

const TOKEN_EXPIRED_MARKER: &str = "Token Expired";

pub struct HttpProfileService {
    client: Client,
    base_url: Url,
    token: String,
    timeout: Duration,
}

impl HttpProfileService {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SwipeError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SwipeError::Config(format!("base URL cannot be joined: {}", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwipeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
            timeout,
        })
    }

    /// Base URL plus percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SwipeError::Config(format!("base URL cannot be joined: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_transport(&self, err: reqwest::Error) -> SwipeError {
        if err.is_timeout() {
            SwipeError::Timeout(self.timeout)
        } else {
            SwipeError::Network(err.to_string())
        }
    }

    /// Send an authenticated request and return its JSON body (`Null` when empty)
    async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header("authorization", &self.token)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "profile service response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(SwipeError::SessionExpired);
        }
        if status.is_server_error() {
            warn!(status = status.as_u16(), "profile service unavailable");
            return Err(SwipeError::ServerError { status: status.as_u16() });
        }

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(_) if status.is_success() => Value::String(body),
                Err(_) => {
                    return Err(SwipeError::UnexpectedStatus {
                        status: status.as_u16(),
                        body,
                    })
                }
            }
        };

        if is_token_expired(&value) {
            return Err(SwipeError::SessionExpired);
        }
        if !status.is_success() {
            return Err(SwipeError::UnexpectedStatus {
                status: status.as_u16(),
                body: value.to_string(),
            });
        }
        Ok(value)
    }
}

/// The service reports expiry in the body rather than with a status code
pub fn is_token_expired(value: &Value) -> bool {
    value.get("token").and_then(Value::as_str) == Some(TOKEN_EXPIRED_MARKER)
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn fetch_candidates(&self, user: &str) -> Result<Vec<CandidateCard>> {
        let url = self.endpoint(&["recommendation", "menu", user])?;
        let value = self.execute(self.client.get(url)).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }

        let items: Vec<MenuItemDto> = serde_json::from_value(value)
            .map_err(|e| SwipeError::ApiParse(format!("recommendation page: {}", e)))?;
        Ok(items.into_iter().map(CandidateCard::from).collect())
    }

    async fn record_like(&self, user: &str, menu_title: &str) -> Result<()> {
        let url = self.endpoint(&["userProfile", "liked", user])?;
        self.execute(self.client.post(url).json(&json!({ "liked_menu": menu_title })))
            .await?;
        Ok(())
    }

    async fn record_dislike(&self, user: &str, menu_title: &str) -> Result<()> {
        let url = self.endpoint(&["userProfile", "disliked", user])?;
        self.execute(self.client.post(url).json(&json!({ "disliked_menu": menu_title })))
            .await?;
        Ok(())
    }

    async fn current_liked(&self, user: &str) -> Result<AuthoritativeCount> {
        let url = self.endpoint(&["userProfile", "currentLiked", user])?;
        let value = self.execute(self.client.get(url)).await?;

        let dto: CurrentLikedDto = serde_json::from_value(value)
            .map_err(|e| SwipeError::ApiParse(format!("currentLiked: {}", e)))?;
        Ok(dto.into())
    }

    async fn remove_liked(&self, user: &str, menu_title: &str) -> Result<()> {
        let url = self.endpoint(&["userProfile", "currentLiked", user])?;
        self.execute(self.client.delete(url).json(&json!({ "menu_name": menu_title })))
            .await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let url = self.endpoint(&["user", "logout"])?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "token": self.token }))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "logout was not acknowledged");
        }
        Ok(())
    }
}
