use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::entities::OrderStatus;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Insufficient stock for {product}")]
    InsufficientStock { product: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// 响应体里的 error.type
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::AuthError(_) | AppError::JwtError(_) => "auth_error",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidState(_) => "invalid_state",
            AppError::IllegalTransition { .. } => "illegal_transition",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::StorageError(_) => "storage_error",
            AppError::DatabaseError(_) => "database_error",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidState(_)
            | AppError::IllegalTransition { .. }
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // 数据库/存储/内部错误只写日志，不把细节返回给客户端
        let message = match self {
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "A database error occurred".to_string()
            }
            AppError::StorageError(msg) => {
                log::error!("Storage error: {msg}");
                "Failed to store uploaded file".to_string()
            }
            AppError::InternalError(msg) => {
                log::error!("Internal error: {msg}");
                "Internal server error".to_string()
            }
            AppError::JwtError(err) => {
                log::warn!("Authentication error: {err}");
                "Invalid or expired token".to_string()
            }
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::InvalidState(msg) => {
                log::warn!("{}: {msg}", self.error_type());
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::IllegalTransition { .. } | AppError::InsufficientStock { .. } => {
                log::warn!("{self}");
                self.to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "type": self.error_type(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn illegal_transition_maps_to_bad_request() {
        let (status, body) = body_json(AppError::IllegalTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["type"], "illegal_transition");
        assert_eq!(
            body["error"]["message"],
            "Illegal status transition from shipped to cancelled"
        );
    }

    #[actix_web::test]
    async fn database_error_hides_details() {
        let (status, body) =
            body_json(AppError::DatabaseError(sea_orm::DbErr::Custom("secret".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "database_error");
        assert_eq!(body["error"]["message"], "A database error occurred");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientStock {
                product: "Kaos".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StorageError("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::AuthError("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
