//! 认证 HTTP 处理器：注册、登录、当前身份

use crate::{
    auth::password::PasswordHasher,
    authz::{Identity, CLIENT_SLUG, FREELANCER_SLUG},
    error::AppError,
    middleware::AppState,
    models::{auth::*, user::*},
    repository::{RoleRepository, UserRepository},
    response::ApiResponse,
};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册：角色通过 slug 选择，自由职业者初始为 pending
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    if req.role != CLIENT_SLUG && req.role != FREELANCER_SLUG {
        return Err(AppError::BadRequest(
            "Invalid role. Allowed: 'client', 'freelancer'".to_string(),
        ));
    }

    let user_repo = UserRepository::new(state.db.clone());

    if user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }
    if user_repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already in use".to_string()));
    }

    // 种子迁移保证 client/freelancer 角色存在；缺失属于部署错误
    let role = RoleRepository::new(state.db.clone())
        .find_by_slug(&req.role)
        .await?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

    PasswordHasher::validate_password_policy(&req.password, &state.config)?;
    let password_hash = PasswordHasher::new().hash(&req.password)?;

    let freelancer_status = (req.role == FREELANCER_SLUG).then_some("pending");

    let user = user_repo
        .create(&req, &password_hash, role.id, freelancer_status)
        .await?;

    let access_token = state.jwt_service.generate_token(&user.id)?;

    Ok(ApiResponse::created(
        "User registered successfully",
        LoginResponse {
            access_token,
            expires_in: state.jwt_service.access_token_exp_secs(),
            user: UserResponse::from(user),
        },
    ))
}

/// 登录：凭证错误统一提示，不泄露账户是否存在
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user = UserRepository::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid email or password".to_string()))?;

    PasswordHasher::new().verify(&req.password, &user.password_hash)?;

    if user.status != "active" {
        return Err(AppError::Forbidden("Account is not active.".to_string()));
    }

    let access_token = state.jwt_service.generate_token(&user.id)?;

    tracing::info!(user_id = %user.id, "Login succeeded");

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            access_token,
            expires_in: state.jwt_service.access_token_exp_secs(),
            user: UserResponse::from(user),
        },
    ))
}

/// 当前身份（用户 + 角色 + 权限）
pub async fn me(identity: Identity) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::ok(
        "Identity resolved",
        json!({
            "user": UserResponse::from(identity.user.clone()),
            "role": identity.role,
        }),
    ))
}
