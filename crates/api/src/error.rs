use reqwest::StatusCode;
use thiserror::Error;

/// Failures reported by the REANA gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The identifier does not resolve to a workflow the caller may see.
    #[error("workflow not found or not accessible")]
    NotFound,
    /// The access token was missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Any other non-success HTTP status.
    #[error("server responded {code}: {message}")]
    Status { code: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Map a non-success status and its body to an error.
    ///
    /// REANA answers 403 for workflows owned by someone else and 404 for
    /// unknown ones; both read as "not found" to the dashboard.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Self::NotFound,
            StatusCode::UNAUTHORIZED => Self::Unauthorized(server_message(body)),
            other => Self::Status {
                code: other.as_u16(),
                message: server_message(body),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Extract `{"message": "..."}` from an error body, falling back to the raw text.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
