//! 成功响应封装
//! 业务响应统一为 {success:true, statusCode, message, data}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// 成功响应 DTO
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl ApiResponse<()> {
    /// 无数据负载的成功响应
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let resp = ApiResponse::ok("Roles fetched successfully", vec!["admin"]);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["message"], "Roles fetched successfully");
        assert_eq!(json["data"][0], "admin");
    }

    #[test]
    fn test_created_status() {
        let resp = ApiResponse::created("Role created successfully", "data");
        assert_eq!(resp.status_code, 201);
    }
}
