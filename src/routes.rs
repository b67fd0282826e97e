//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限（2 MiB）
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/api/v1/auth/signup", post(handlers::auth::signup))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    // 角色公开读：携带有效凭证则解析身份，匿名亦可访问
    let role_read_routes = Router::new()
        .route("/api/v1/roles", get(handlers::role::list_roles))
        .route("/api/v1/roles/{id}", get(handlers::role::get_role))
        .layer(from_fn_with_state(
            state.clone(),
            crate::auth::middleware::optional_auth_middleware,
        ));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前身份
        .route("/api/v1/auth/me", get(handlers::auth::me))

        // 角色写操作（按 (action, "role") 权限门控）
        .route("/api/v1/roles", post(handlers::role::create_role))
        .route(
            "/api/v1/roles/{id}",
            axum::routing::put(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )

        // 权限条目管理
        .route(
            "/api/v1/permissions",
            get(handlers::permission::list_permissions)
                .post(handlers::permission::create_permission),
        )
        .route(
            "/api/v1/permissions/{id}",
            get(handlers::permission::get_permission)
                .put(handlers::permission::update_permission)
                .delete(handlers::permission::delete_permission),
        )

        // 用户管理
        .route("/api/v1/users", get(handlers::user::list_users))
        .route(
            "/api/v1/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route(
            "/api/v1/users/{id}/freelancer-review",
            post(handlers::user::review_freelancer),
        )

        // 实时事件流 (SSE)
        .route("/api/v1/stream/events", get(handlers::events::event_stream))
        .layer(from_fn_with_state(
            state.clone(),
            crate::auth::middleware::auth_middleware,
        ));

    // 指标端点
    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_export));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(role_read_routes)
        .merge(authenticated_routes)
        .merge(metrics_routes)
        .layer(from_fn(crate::middleware::request_tracking_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
