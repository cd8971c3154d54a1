use axum::http::StatusCode;

/// Failure of a backend call.
///
/// `Rejected` is the application-level failure: the backend answered with a
/// well-formed envelope whose status was not `"success"`. The other variants
/// are transport-level and carry a generic user-facing message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Rejected(_))
    }

    /// Text suitable for a toast: the server's message for rejections, a
    /// generic line naming the attempted operation otherwise.
    pub fn user_message(&self, operation: &str) -> String {
        match self {
            ApiError::Rejected(message) => format!("Failed to {operation}: {message}"),
            _ => format!("An error occurred while trying to {operation}."),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Malformed(err.to_string())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
