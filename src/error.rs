use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    response::ApiResponse,
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please log in to continue")]
    NotLoggedIn,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Only {available} left in stock, {requested} requested")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("Cart already holds {in_cart}; adding {requested} would exceed the {available} in stock")]
    ExceedsStock {
        in_cart: i32,
        requested: i32,
        available: i32,
    },

    #[error("Remote store error")]
    Remote(#[from] StoreError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code so clients can pick their own messaging.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotLoggedIn => "not_logged_in",
            AppError::InvalidSession => "invalid_session",
            AppError::Forbidden => "forbidden",
            AppError::NotFound => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::ExceedsStock { .. } => "exceeds_stock",
            AppError::Remote(_) => "remote_error",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotLoggedIn | AppError::InvalidSession => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock { .. } | AppError::ExceedsStock { .. } => {
                StatusCode::CONFLICT
            }
            AppError::Remote(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorData {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Remote(err) => tracing::error!(error = %err, "remote store failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse::failure(
            self.to_string(),
            ErrorData {
                error: self.to_string(),
                code: self.code().to_string(),
            },
        );

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
