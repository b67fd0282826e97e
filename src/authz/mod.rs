//! 授权核心
//! Identity（已解析身份）+ 请求要求（Requirement）+ 资源访问策略

pub mod policy;
pub mod requirement;

pub use policy::{policy_for, requirement_for, visibility_filter, AccessPolicy, Operation, WriteRule};
pub use requirement::{authorize, Requirement};

use crate::error::AppError;
use crate::models::{role::RoleWithPermissions, user::User};
use axum::extract::FromRequestParts;
use uuid::Uuid;

/// 管理员角色的 slug；slug 门控与权限门控并存（见 requirement.rs）
pub const ADMIN_SLUG: &str = "admin";
pub const FREELANCER_SLUG: &str = "freelancer";
pub const CLIENT_SLUG: &str = "client";

/// 已解析的身份：用户连同其角色与权限集合。
/// 由 Identity Resolver 一次性构造；下游判定不再访问存储，
/// 也因此不可能出现 Role 为空的身份。
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub role: RoleWithPermissions,
}

impl Identity {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role_slug(&self) -> &str {
        self.role.slug()
    }

    pub fn is_admin(&self) -> bool {
        self.role_slug() == ADMIN_SLUG
    }

    /// 资源归属判定
    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.id() == owner_id
    }
}

// 从请求扩展提取 Identity；匿名请求命中受保护操作时返回 401，绝不视作匿名放行
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::NoToken)
    }
}

/// 可选身份：公开读路由上存在有效凭证则携带身份，否则匿名继续
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}
