//! 权限条目 HTTP 处理器
//! 授权结构本体的增删改查仅限管理员（与 policy_for("permission") 一致）

use crate::{
    authz::{authorize, Identity, Requirement},
    error::AppError,
    middleware::AppState,
    models::role::*,
    response::ApiResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 列出权限条目
pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    let page = state.permission_service.list(&query).await?;
    Ok(ApiResponse::ok("Permissions fetched successfully", page))
}

/// 权限条目详情
pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    let permission = state.permission_service.get(&id).await?;
    Ok(ApiResponse::ok("Permission retrieved successfully", permission))
}

/// 创建权限条目
pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;
    req.validate()?;

    let permission = state.permission_service.create(&req).await?;

    Ok(ApiResponse::created("Permission created successfully", permission))
}

/// 更新权限条目
pub async fn update_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePermissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;
    req.validate()?;

    let permission = state.permission_service.update(id, &req).await?;

    Ok(ApiResponse::ok("Permission updated successfully", permission))
}

/// 删除权限条目
pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    state.permission_service.delete(id).await?;

    Ok(ApiResponse::message("Permission deleted successfully"))
}
