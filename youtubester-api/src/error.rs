//! Error types for the YouTubester API client

use serde::Deserialize;
use thiserror::Error;
use youtubester_core::consent::ConsentSignal;
use youtubester_core::StatusError;

/// `code` the server puts in a 403 body when write consent is missing
pub const WRITE_CONSENT_REQUIRED_CODE: &str = "WRITE_CONSENT_REQUIRED";

// ============================================================================
// API Error Types
// ============================================================================

/// RFC 7807 problem details, as returned by the backend on errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    /// Machine-readable error code
    #[serde(default)]
    pub code: Option<String>,
}

// ============================================================================
// Client Error Types
// ============================================================================

/// Errors that can occur when calling the YouTubester API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {}", message_for(*status, problem.as_ref(), body))]
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed problem details, if the body was JSON
        problem: Option<ProblemDetails>,
        /// Raw response body
        body: String,
    },

    /// Network error (connection, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response (failed to parse a success body)
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (bad base URL, client construction)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn message_for(status: u16, problem: Option<&ProblemDetails>, body: &str) -> String {
    if let Some(problem) = problem {
        if let Some(detail) = problem.detail.as_deref().or(problem.title.as_deref()) {
            return detail.to_string();
        }
        if let Some(code) = problem.code.as_deref() {
            return code.to_string();
        }
    }
    if body.is_empty() {
        format!("request failed with status {}", status)
    } else {
        body.to_string()
    }
}

impl ApiError {
    /// Build a status error from a response status and body
    ///
    /// The body is parsed as problem details when it is JSON; anything else
    /// is kept only as raw text.
    pub fn from_status(status: u16, body: String) -> Self {
        let problem = serde_json::from_str::<ProblemDetails>(&body).ok();
        ApiError::Status {
            status,
            problem,
            body,
        }
    }

    /// Classify a transport error
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), String::new())
        } else {
            ApiError::Network(format!("Request failed: {}", err))
        }
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable `code` from the problem body, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                problem: Some(problem),
                ..
            } => problem.code.as_deref(),
            _ => None,
        }
    }

    /// Returns true for 401: the session cookie is missing or expired
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl ConsentSignal for ApiError {
    /// Exactly a 403 whose JSON body carries the consent-required code.
    fn is_write_consent_required(&self) -> bool {
        self.status() == Some(403) && self.code() == Some(WRITE_CONSENT_REQUIRED_CODE)
    }
}

impl From<ApiError> for StatusError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, .. } => StatusError::Http { status },
            ApiError::Network(msg) => StatusError::Network(msg),
            ApiError::InvalidResponse(msg) => StatusError::InvalidResponse(msg),
            ApiError::Json(e) => StatusError::InvalidResponse(e.to_string()),
            ApiError::Configuration(msg) => StatusError::Other(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Consent Signal Tests =====

    #[test]
    fn test_consent_required_signature() {
        let err = ApiError::from_status(
            403,
            r#"{"title":"Forbidden","status":403,"code":"WRITE_CONSENT_REQUIRED"}"#.to_string(),
        );
        assert!(err.is_write_consent_required());
        assert_eq!(err.code(), Some("WRITE_CONSENT_REQUIRED"));
    }

    #[test]
    fn test_forbidden_with_other_code() {
        let err = ApiError::from_status(403, r#"{"code":"CHANNEL_MISMATCH"}"#.to_string());
        assert!(!err.is_write_consent_required());
    }

    #[test]
    fn test_forbidden_without_code() {
        let err = ApiError::from_status(403, r#"{"title":"Forbidden"}"#.to_string());
        assert!(!err.is_write_consent_required());
    }

    #[test]
    fn test_forbidden_with_non_json_body() {
        let err = ApiError::from_status(403, "WRITE_CONSENT_REQUIRED".to_string());
        assert!(!err.is_write_consent_required());
        assert!(matches!(err, ApiError::Status { problem: None, .. }));
    }

    #[test]
    fn test_code_on_other_status_is_ignored() {
        let err = ApiError::from_status(500, r#"{"code":"WRITE_CONSENT_REQUIRED"}"#.to_string());
        assert!(!err.is_write_consent_required());
    }

    #[test]
    fn test_network_error_is_not_consent_error() {
        assert!(!ApiError::Network("refused".into()).is_write_consent_required());
    }

    // ===== Status Helpers =====

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::from_status(401, String::new()).is_unauthorized());
        assert!(!ApiError::from_status(403, String::new()).is_unauthorized());
        assert!(!ApiError::Network("x".into()).is_unauthorized());
    }

    // ===== Display Tests =====

    #[test]
    fn test_display_prefers_problem_detail() {
        let err = ApiError::from_status(
            400,
            r#"{"title":"Bad Request","detail":"sourceUrl is not a YouTube video"}"#.to_string(),
        );
        assert_eq!(err.to_string(), "HTTP 400: sourceUrl is not a YouTube video");
    }

    #[test]
    fn test_display_falls_back_to_code_then_body() {
        let err = ApiError::from_status(403, r#"{"code":"WRITE_CONSENT_REQUIRED"}"#.to_string());
        assert_eq!(err.to_string(), "HTTP 403: WRITE_CONSENT_REQUIRED");

        let err = ApiError::from_status(502, "Bad Gateway".to_string());
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        let err = ApiError::from_status(500, String::new());
        assert_eq!(err.to_string(), "HTTP 500: request failed with status 500");
    }

    // ===== Conversion Tests =====

    #[test]
    fn test_into_status_error() {
        let status: StatusError = ApiError::from_status(401, String::new()).into();
        assert!(matches!(status, StatusError::Http { status: 401 }));

        let status: StatusError = ApiError::Network("down".into()).into();
        assert!(matches!(status, StatusError::Network(_)));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(err, ApiError::Json(_)));
    }
}
