//! API error taxonomy with backend payload passthrough.

/// Errors from backend API calls.
///
/// The backend reports failures as `{detail: …}` or `{error: …}`
/// payloads; those strings ride along in the matching variant so call
/// sites can surface them verbatim. `user_message()` is the alert
/// text: the backend detail when present, a generic fallback when not.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Could not connect to {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Transport error: {0}")]
    Transport(String),
    /// 401 that survived the single refresh retry, or a failed login.
    #[error("Authentication failed: {detail}")]
    Auth { detail: String },
    /// 403: access not granted.
    #[error("Access denied: {detail}")]
    Forbidden { detail: String },
    /// 400: backend-side validation rejected the payload.
    #[error("Invalid request: {detail}")]
    Validation { detail: String },
    /// Any other non-success status.
    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    /// An authenticated call was attempted with no stored tokens.
    #[error("Not logged in")]
    NoSession,
}

/// Alert fallback, matching what the backend omits.
const GENERIC_MESSAGE: &str = "An error occurred";

impl ApiError {
    /// The user-facing alert text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth { detail }
            | ApiError::Forbidden { detail }
            | ApiError::Validation { detail }
            | ApiError::Backend { detail, .. }
                if !detail.is_empty() =>
            {
                detail.clone()
            }
            _ => GENERIC_MESSAGE.to_string(),
        }
    }

    /// Build the status-mapped error for a non-success response.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => ApiError::Auth { detail },
            403 => ApiError::Forbidden { detail },
            400 => ApiError::Validation { detail },
            _ => ApiError::Backend { status, detail },
        }
    }
}
