//! 认证中间件
//! 提取 bearer 凭证并解析身份（用户 + 角色 + 权限），附加到请求扩展

use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::NoToken)
}

/// 必须认证的中间件
/// 失败分支各自独立：无凭证 401、过期 401、无效 401、用户不存在 404、角色不存在 404
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let identity = state.identity_resolver.resolve(&token).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// 可选认证 - 公开读路由上携带有效凭证则解析身份，否则匿名继续。
/// 注意：这里只对"无凭证"宽容；畸形或过期凭证同样按匿名处理，
/// 因为公开读本来就无需身份，绝不因此放大权限。
pub async fn optional_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Ok(token) = extract_token(req.headers()) {
        if let Ok(identity) = state.identity_resolver.resolve(&token).await {
            req.extensions_mut().insert(identity);
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AppError::NoToken)));
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(matches!(extract_token(&headers), Err(AppError::NoToken)));
    }
}
