//! 健康检查处理器

use crate::{db, middleware::AppState};
use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::OnceCell;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

static START_TIME: OnceCell<Instant> = OnceCell::new();

/// 记录应用启动时间
pub fn set_start_time() {
    let _ = START_TIME.set(Instant::now());
}

/// 进程运行时长（秒）
pub fn get_uptime() -> u64 {
    START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// 存活检查：进程在即健康
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": get_uptime(),
    }))
}

/// 就绪检查：数据库可达才算就绪
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    db::record_pool_metrics(&state.db);

    match db::health_check(&state.db).await {
        db::HealthStatus::Healthy => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "database": "ok" })),
        ),
        db::HealthStatus::Unhealthy(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "database": reason })),
        ),
    }
}
