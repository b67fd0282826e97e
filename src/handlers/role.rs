//! 角色管理 HTTP 处理器
//! 读公开；写由 (action, "role") 权限门控，管理员兜底

use crate::{
    authz::{authorize, visibility_filter, Identity, MaybeIdentity, Requirement},
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

/// (action, "role") 权限或管理员
fn role_requirement(action: &str) -> Requirement {
    Requirement::AnyOf(vec![
        Requirement::permission(action, "role"),
        Requirement::admin(),
    ])
}

/// 列出角色（公开读；非管理员只看到 active 的角色）
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(identity): MaybeIdentity,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let visibility = visibility_filter("role", identity.as_ref());
    let page = state.role_service.list(&query, visibility).await?;
    Ok(ApiResponse::ok("Roles fetched successfully", page))
}

/// 角色详情（公开读）
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = state.role_service.get(&id).await?;
    Ok(ApiResponse::ok("Role retrieved successfully", role))
}

/// 创建角色
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(req): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &role_requirement("create"))?;
    req.validate()?;

    let role = state.role_service.create(&req).await?;

    Ok(ApiResponse::created("Role created successfully", role))
}

/// 更新角色（可含原子权限替换）
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &role_requirement("update"))?;
    req.validate()?;

    let role = state.role_service.update(id, &req).await?;

    Ok(ApiResponse::ok("Role updated successfully", role))
}

/// 删除角色
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &role_requirement("delete"))?;

    state.role_service.delete(id).await?;

    Ok(ApiResponse::message("Role deleted successfully"))
}
