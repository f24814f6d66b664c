use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use logbook_common::models::{error::ApiError, log::InvalidLog};
use tracing::error;

use crate::dal::DalError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidLog(#[from] InvalidLog),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Dal(#[from] DalError),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let api_error = match self {
            Error::InvalidLog(_)
            | Error::BadRequest(_)
            | Error::Dal(DalError::Validation(_)) => {
                ApiError::new(self.to_string(), StatusCode::BAD_REQUEST)
            }
            Error::Dal(DalError::NotFound) => ApiError::from(StatusCode::NOT_FOUND),
            Error::Dal(ref error) => {
                // Only internal errors are worth an error event, callers get a generic message
                error!(error = %error, "logs database request failed");

                ApiError::from(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        api_error.into_response()
    }
}
