//! 用户管理 HTTP 处理器
//! 列表/删除仅管理员；详情/更新本人或管理员；审批为管理员专属状态流转

use crate::{
    authz::{authorize, Identity, Requirement},
    error::AppError,
    middleware::AppState,
    models::{
        role::{ListQuery, PagedResponse},
        user::*,
    },
    repository::UserRepository,
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

/// 列出用户（仅管理员）
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    let (users, total) = UserRepository::new(state.db.clone()).list(&query).await?;
    let (page, limit) = query.normalize();

    let page = PagedResponse {
        total,
        page,
        limit,
        data: users.into_iter().map(UserResponse::from).collect(),
    };

    Ok(ApiResponse::ok("Users fetched successfully", page))
}

/// 用户详情（本人或管理员）
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::owner_or_admin(id))?;

    let user = UserRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(ApiResponse::ok(
        "User retrieved successfully",
        UserResponse::from(user),
    ))
}

/// 更新用户（本人或管理员；status 字段仅管理员可改）
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::owner_or_admin(id))?;
    req.validate()?;

    if let Some(status) = &req.status {
        authorize(&identity, &Requirement::admin())?;
        if !USER_STATUSES.contains(&status.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid status. Allowed: {}",
                USER_STATUSES.join(", ")
            )));
        }
    }

    let user = UserRepository::new(state.db.clone())
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(ApiResponse::ok(
        "User updated successfully",
        UserResponse::from(user),
    ))
}

/// 删除用户（仅管理员，且不允许删除自己）
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    if identity.id() == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = UserRepository::new(state.db.clone()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("User".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %identity.id(), "User deleted");

    Ok(ApiResponse::message("User deleted successfully"))
}

/// 审批自由职业者（状态流转，仅管理员）
pub async fn review_freelancer(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<FreelancerReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&identity, &Requirement::admin())?;

    if req.decision != "approved" && req.decision != "rejected" {
        return Err(AppError::BadRequest(
            "Invalid decision. Allowed: 'approved', 'rejected'".to_string(),
        ));
    }

    let repo = UserRepository::new(state.db.clone());

    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if user.freelancer_status.is_none() {
        return Err(AppError::BadRequest(
            "User is not a freelancer account".to_string(),
        ));
    }

    let user = repo
        .update_freelancer_status(id, &req.decision)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    tracing::info!(
        user_id = %id,
        decision = %req.decision,
        reviewed_by = %identity.id(),
        "Freelancer review recorded"
    );

    Ok(ApiResponse::ok(
        "Freelancer status updated successfully",
        UserResponse::from(user),
    ))
}
