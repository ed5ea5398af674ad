use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::{handler::validation::FieldError, service::accounts::AccountError};

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    #[error("invalid account id {0:?}")]
    InvalidId(String),
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId(_) | ApiError::Body(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Account(err) => match err {
                AccountError::NotFound(_) => StatusCode::NOT_FOUND,
                AccountError::Exists(_) => StatusCode::CONFLICT,
                AccountError::InvalidPassword => StatusCode::UNAUTHORIZED,
                AccountError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AccountError::Hash(_) | AccountError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::InvalidId(_) => "invalid_id",
            ApiError::Body(_) => "invalid_body",
            ApiError::Account(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let errors = match self {
            ApiError::Validation(errors) => errors,
            _ => Vec::new(),
        };

        (
            status,
            Json(ErrorResponse {
                code,
                message,
                errors,
            }),
        )
            .into_response()
    }
}
