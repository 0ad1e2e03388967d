use crate::http::HttpError;

/// Failure of one API call, split so callers can react: 401 clears the
/// stored session, transport kinds drive the retry policy, everything else
/// is surfaced to the operator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] HttpError),
    #[error("session expired or rejected by the server")]
    Unauthorized,
    #[error("server returned HTTP {status}: {message}")]
    Http { status: u32, message: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(String),
}
