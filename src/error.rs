//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 请求未携带凭证
    #[error("Unauthorized, no token provided")]
    NoToken,

    /// 凭证已过期（客户端应提示重新登录）
    #[error("Unauthorized, token expired")]
    TokenExpired,

    /// 凭证格式错误或签名无效
    #[error("Unauthorized, invalid token")]
    TokenInvalid(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Access denied. {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 存储暂时不可达（超时等），绝不降级为放行
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoToken | AppError::TokenExpired | AppError::TokenInvalid(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::NoToken => "Unauthorized, no token provided".to_string(),
            AppError::TokenExpired => "Unauthorized, token expired".to_string(),
            AppError::TokenInvalid(_) => "Unauthorized, invalid token".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Forbidden(msg) => format!("Access denied. {}", msg),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Unavailable(_) => "Service temporarily unavailable".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 附加的非敏感错误细节（进入响应体的 error 字段）
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::TokenInvalid(detail) => Some(detail.clone()),
            AppError::Validation(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
/// 线上契约：{success:false, statusCode, message, error}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            success: false,
            status_code: self.code(),
            message: self.user_message(),
            error: self.detail(),
        };

        // 缺失的 Role/User 引用是数据异常，与普通拒绝分开记录
        match &self {
            AppError::NotFound(what) if what == "Role" || what == "User" => {
                tracing::error!(code = self.code(), message = %self, "Referential integrity failure");
            }
            AppError::Forbidden(_) | AppError::NoToken | AppError::TokenExpired => {
                tracing::warn!(code = self.code(), message = %self, "Request denied");
            }
            _ => {
                tracing::error!(code = self.code(), message = %self, "Application error");
            }
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 sqlx::Error 转换；连接池超时映射为 Unavailable
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => {
                AppError::Unavailable("database pool timed out".to_string())
            }
            other => AppError::Database(other),
        }
    }
}

/// 从 String 转换为 AppError::Config
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Config(s)
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator 校验错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
