use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error {status} persisted after {attempts} attempts: {body}")]
    TransientServer {
        status: StatusCode,
        attempts: u32,
        body: String,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request failed with status {status}: {body}")]
    Request { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Statuses worth retrying on a side-effect-free request
const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn is_transient_status(status: StatusCode) -> bool {
        TRANSIENT_STATUSES.contains(&status.as_u16())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Request {
            status,
            body: Self::truncate_body(body),
        }
    }

    pub fn transient(status: StatusCode, attempts: u32, body: &str) -> Self {
        ApiError::TransientServer {
            status,
            attempts,
            body: Self::truncate_body(body),
        }
    }

    /// Rejections from the logon and refresh endpoints.
    pub fn rejected_credentials(status: StatusCode, body: &str) -> Self {
        ApiError::Authentication(format!("Status {}: {}", status, Self::truncate_body(body)))
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::TransientServer { status, .. } | ApiError::Request { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }
}
