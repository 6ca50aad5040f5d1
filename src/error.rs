use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Store {0} is not accepting orders")]
    StoreClosed(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Already processed")]
    AlreadyProcessed,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::EmptyCart | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::StoreClosed(_) | AppError::AlreadyProcessed | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Persistence(err) => tracing::error!(error = %err, "persistence failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal failure"),
            _ => {}
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::StoreClosed(Uuid::nil()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::AlreadyProcessed.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Validation("phone_number is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_failures_map_to_500() {
        let err = AppError::from(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
