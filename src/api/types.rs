use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not logged in or session expired")]
    Unauthorized,

    #[error("Request failed: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
