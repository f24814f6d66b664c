use std::fmt::{Display, Formatter};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body of every unsuccessful HTTP response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code: status.as_u16(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\nMessage: {}", self.status(), self.message)
    }
}

impl std::error::Error for ApiError {}

// Used as a fallback when there is nothing more specific to tell the caller
impl From<StatusCode> for ApiError {
    fn from(code: StatusCode) -> Self {
        let message = match code {
            StatusCode::BAD_REQUEST => {
                warn!("responding to a BAD_REQUEST request with an unhelpful message");
                "this request is invalid"
            }
            StatusCode::NOT_FOUND => "log not found",
            StatusCode::INTERNAL_SERVER_ERROR => "our server was unable to handle your request",
            _ => {
                error!(%code, "got an unexpected status code");
                "an unexpected error occurred"
            }
        };

        Self::new(message, code)
    }
}

#[cfg(feature = "backend")]
pub mod axum {
    use axum::response::{IntoResponse, Json, Response};

    use super::ApiError;

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            (self.status(), Json(self)).into_response()
        }
    }
}
