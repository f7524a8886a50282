use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no signed-in session")]
    MissingSession,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<&ClientError> for ApiError {
    fn from(value: &ClientError) -> Self {
        let code = match value {
            ClientError::Api { status, .. } => ErrorCode::from_status(*status),
            ClientError::MissingSession => ErrorCode::Unauthorized,
            _ => ErrorCode::Internal,
        };
        ApiError::new(code, value.to_string())
    }
}
