use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a call to the backend API.
///
/// The mediator never turns these into navigation decisions; a 401 or 403
/// here is the backend's own authorization speaking.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Backend rejected the session credential")]
    Unauthorized,

    #[error("Backend denied access: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend is throttling requests")]
    RateLimited,

    #[error("Backend failed with {status}: {body}")]
    Server { status: StatusCode, body: String },

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL {0}")]
    InvalidUrl(String),
}

/// Longest response body excerpt kept in an error
const BODY_EXCERPT_BYTES: usize = 500;

fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_BYTES {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &body[..end], body.len())
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(excerpt(body)),
            StatusCode::NOT_FOUND => ApiError::NotFound(excerpt(body)),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            s if s.is_server_error() => ApiError::Server {
                status,
                body: excerpt(body),
            },
            _ => ApiError::UnexpectedStatus {
                status,
                body: excerpt(body),
            },
        }
    }

    /// Whether the backend refused the caller's identity or role. The caller
    /// typically drops the stored session and navigates to login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Forbidden(_))
    }
}
