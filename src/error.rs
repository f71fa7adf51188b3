use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::cache::StoreError;
use crate::utils::{ApiResponse, error_codes};

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub property: String,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("too many requests, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

// 请求体无法解析时按校验错误返回
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError {
            property: "body".into(),
            error: rejection.body_text(),
        }])
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> i32 {
        match self {
            AppError::Unauthorized => error_codes::AUTH_FAILED,
            AppError::RateLimited { .. } => error_codes::RATE_LIMIT,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Store(_) | AppError::Database(_) | AppError::Internal(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let retry_after = match &self {
            AppError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };

        let mut response = match self {
            AppError::Validation(errors) => (
                status,
                axum::Json(ApiResponse {
                    code,
                    msg: "Validation Error".to_string(),
                    resp_data: Some(errors),
                }),
            )
                .into_response(),
            AppError::RateLimited { .. } => (
                status,
                axum::Json(ApiResponse::<()> {
                    code,
                    msg: "Too many requests. Please try again later.".to_string(),
                    resp_data: None,
                }),
            )
                .into_response(),
            AppError::Database(ref e) => {
                // 数据库细节不暴露给客户端
                tracing::error!("Database error: {}", e);
                (
                    status,
                    axum::Json(ApiResponse::<()> {
                        code,
                        msg: "Internal Server Error".to_string(),
                        resp_data: None,
                    }),
                )
                    .into_response()
            }
            other => (
                status,
                axum::Json(ApiResponse::<()> {
                    code,
                    msg: other.to_string(),
                    resp_data: None,
                }),
            )
                .into_response(),
        };

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
