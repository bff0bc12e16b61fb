//! YouTubester API client

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use youtubester_core::consent::{AuthStatus, AuthStatusSource};
use youtubester_core::StatusError;

use crate::error::ApiError;
use crate::replies::{ApproveRepliesResult, DraftDecisionDto, Reply};
use crate::videos::{CopyVideoTemplateRequest, ListVideosParams, VideoPage};

/// Default API base URL (the backend's development address)
pub const DEFAULT_API_BASE: &str = "http://localhost:5094";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable read by [`Youtubester::from_env`]
pub const API_BASE_ENV: &str = "YOUTUBESTER_API_BASE";

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const AUTH_ME_PATH: &str = "/api/auth/me";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const VIDEOS_PATH: &str = "/api/videos";
pub const COPY_TEMPLATE_PATH: &str = "/api/videos/copy-template";
pub const REPLIES_PATH: &str = "/api/replies";
pub const APPROVE_REPLIES_PATH: &str = "/api/replies/approve";

/// Server route template of a single reply, as the classification table keys it
pub const REPLY_PATH_TEMPLATE: &str = "/api/replies/{id}";

/// Path of a single reply
pub fn reply_path(id: &str) -> String {
    format!("{}/{}", REPLIES_PATH, urlencoding::encode(id))
}

// ============================================================================
// Response Types
// ============================================================================

/// Body of `GET /api/auth/me`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMe {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub has_write_access: Option<bool>,
}

// ============================================================================
// Client
// ============================================================================

/// YouTubester backend client
///
/// Requests carry the session cookie through the client's cookie store, the
/// same way a browser sends credentials on same-origin calls.
#[derive(Clone, Debug)]
pub struct Youtubester {
    client: reqwest::Client,
    api_base: String,
}

impl Youtubester {
    /// Create a client for `api_base`
    pub fn new(api_base: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder().api_base(api_base).build()
    }

    /// Create a client from the `YOUTUBESTER_API_BASE` environment variable
    ///
    /// Falls back to [`DEFAULT_API_BASE`] when unset.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(api_base)
    }

    /// Create a builder for more advanced configuration
    pub fn builder() -> YoutubesterBuilder {
        YoutubesterBuilder::new()
    }

    /// Base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    // ===== Authentication =====

    /// Current user and permissions
    pub async fn auth_me(&self) -> Result<AuthMe, ApiError> {
        self.get_json(AUTH_ME_PATH, &[]).await
    }

    /// End the server session
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(Method::POST, LOGOUT_PATH, &[], None::<&()>)
            .await
            .map(drop)
    }

    // ===== Videos =====

    /// One page of the channel's videos
    pub async fn list_videos(&self, params: &ListVideosParams) -> Result<VideoPage, ApiError> {
        self.get_json(VIDEOS_PATH, &params.query_pairs()).await
    }

    /// Copy metadata from one video to another
    pub async fn copy_template(&self, request: &CopyVideoTemplateRequest) -> Result<(), ApiError> {
        self.execute(Method::POST, COPY_TEMPLATE_PATH, &[], Some(request))
            .await
            .map(drop)
    }

    // ===== Replies =====

    /// All pulled comments with their suggested replies
    pub async fn list_replies(&self) -> Result<Vec<Reply>, ApiError> {
        self.get_json(REPLIES_PATH, &[]).await
    }

    /// Post approved replies to YouTube
    pub async fn approve_replies(
        &self,
        decisions: &[DraftDecisionDto],
    ) -> Result<ApproveRepliesResult, ApiError> {
        let response = self
            .execute(Method::POST, APPROVE_REPLIES_PATH, &[], Some(decisions))
            .await?;
        parse_json(response).await
    }

    /// Discard a suggested reply
    pub async fn delete_reply(&self, id: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &reply_path(id), &[], None::<&()>)
            .await
            .map(drop)
    }

    // ===== Request Execution =====

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, query, None::<&()>).await?;
        parse_json(response).await
    }

    /// Send a request and turn non-success statuses into [`ApiError::Status`]
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await.map_err(ApiError::from_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%method, path, status = status.as_u16(), "API request failed");
        Err(ApiError::from_status(status.as_u16(), body))
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;
    serde_json::from_str(&text)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl AuthStatusSource for Youtubester {
    async fn fetch_auth_status(&self) -> Result<AuthStatus, StatusError> {
        let me = self.auth_me().await?;
        Ok(AuthStatus {
            has_write_access: me.has_write_access,
        })
    }
}

/// Builder for [`Youtubester`] client configuration
pub struct YoutubesterBuilder {
    api_base: Option<String>,
    timeout: Option<Duration>,
}

impl YoutubesterBuilder {
    fn new() -> Self {
        Self {
            api_base: None,
            timeout: None,
        }
    }

    /// Set the API base URL (default: `http://localhost:5094`)
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the request timeout (default: 10s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Youtubester, ApiError> {
        let api_base = self
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        url::Url::parse(&api_base).map_err(|e| {
            ApiError::Configuration(format!("Invalid API base '{}': {}", api_base, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Youtubester {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = Youtubester::builder().build().unwrap();
        assert_eq!(client.api_base(), DEFAULT_API_BASE);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = Youtubester::new("https://dash.example.com/").unwrap();
        assert_eq!(client.api_base(), "https://dash.example.com");
        assert_eq!(
            client.url(COPY_TEMPLATE_PATH),
            "https://dash.example.com/api/videos/copy-template"
        );
    }

    #[test]
    fn test_builder_rejects_invalid_base() {
        let err = Youtubester::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn test_reply_path_encodes_id() {
        assert_eq!(reply_path("abc"), "/api/replies/abc");
        assert_eq!(reply_path("a/b"), "/api/replies/a%2Fb");
    }

    #[test]
    fn test_auth_me_deserialization() {
        let me: AuthMe = serde_json::from_str(
            r#"{"email":"me@example.com","name":"Me","hasWriteAccess":true}"#,
        )
        .unwrap();
        assert_eq!(me.has_write_access, Some(true));
        assert_eq!(me.picture, None);
    }
}
