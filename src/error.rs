use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    response::{ApiResponse, Meta},
    storage::BlobError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("Payload Too Large {0}")]
    PayloadTooLarge(String),

    #[error("{what} upload failed")]
    Upload {
        what: &'static str,
        #[source]
        source: BlobError,
    },

    #[error("Order failed: {0}")]
    OrderFailed(#[source] sea_orm::DbErr),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl AppError {
    /// Classifies a blob store failure for the upload named by `what`.
    /// Rejected input is the client's fault; anything else is the backend's.
    pub fn upload(what: &'static str, err: BlobError) -> Self {
        match err {
            BlobError::Empty => AppError::BadRequest(format!("{what} is empty")),
            BlobError::UnsupportedType(t) => {
                AppError::BadRequest(format!("{what} must be an image, got {t}"))
            }
            BlobError::TooLarge { size, limit } => AppError::PayloadTooLarge(format!(
                "{what} is {size} bytes, limit is {limit}"
            )),
            source => AppError::Upload { what, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload { .. } => StatusCode::BAD_GATEWAY,
            AppError::OrderFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        let message = self.to_string();

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
