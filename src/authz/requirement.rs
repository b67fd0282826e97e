//! 授权门（Gate）
//! 把散落在各控制器里的 admin/freelancer/client/ownerOrAdmin/checkPermission
//! 判定收敛成一个可组合的标签联合体，短路求值，纯同步，无副作用。

use super::{Identity, ADMIN_SLUG};
use crate::error::AppError;
use uuid::Uuid;

/// 请求要求
#[derive(Debug, Clone)]
pub enum Requirement {
    /// 仅要求身份解析成功（中间件已保证），恒通过
    Authenticated,
    /// 角色 slug 必须精确等于给定值
    RoleSlug(String),
    /// 角色权限集中必须存在 (action, resource) 精确匹配
    Permission { action: String, resource: String },
    /// 行为者必须是资源属主
    Owner { owner_id: Uuid },
    /// 属主或管理员
    OwnerOrAdmin { owner_id: Uuid },
    /// 任一子要求通过即通过（短路）
    AnyOf(Vec<Requirement>),
    /// 所有子要求通过才通过（短路）
    AllOf(Vec<Requirement>),
}

impl Requirement {
    pub fn role_slug(slug: impl Into<String>) -> Self {
        Requirement::RoleSlug(slug.into())
    }

    pub fn permission(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Requirement::Permission {
            action: action.into(),
            resource: resource.into(),
        }
    }

    pub fn admin() -> Self {
        Requirement::RoleSlug(ADMIN_SLUG.to_string())
    }

    pub fn owner_or_admin(owner_id: Uuid) -> Self {
        Requirement::OwnerOrAdmin { owner_id }
    }

    fn passes(&self, identity: &Identity) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::RoleSlug(slug) => identity.role_slug() == slug,
            Requirement::Permission { action, resource } => {
                identity.role.has_permission(action, resource)
            }
            Requirement::Owner { owner_id } => identity.owns(*owner_id),
            Requirement::OwnerOrAdmin { owner_id } => {
                identity.owns(*owner_id) || identity.is_admin()
            }
            Requirement::AnyOf(reqs) => reqs.iter().any(|r| r.passes(identity)),
            Requirement::AllOf(reqs) => reqs.iter().all(|r| r.passes(identity)),
        }
    }

    /// 拒绝消息只点名未满足的要求类别，不泄露他人数据的存在性
    fn denial_message(&self) -> String {
        match self {
            Requirement::Authenticated => "Authentication required.".to_string(),
            Requirement::RoleSlug(slug) if slug == ADMIN_SLUG => {
                "Admin role required.".to_string()
            }
            Requirement::RoleSlug(_) => "Insufficient permissions.".to_string(),
            Requirement::Permission { action, resource } => {
                format!("You do not have permission to {} on {}.", action, resource)
            }
            Requirement::Owner { .. } | Requirement::OwnerOrAdmin { .. } => {
                "You are not authorized to access this resource.".to_string()
            }
            Requirement::AnyOf(_) | Requirement::AllOf(_) => {
                "Insufficient permissions.".to_string()
            }
        }
    }
}

/// 授权判定。身份解析必须已经成功；求值本身纯同步、幂等，
/// 不修改身份、角色或资源状态。
pub fn authorize(identity: &Identity, requirement: &Requirement) -> Result<(), AppError> {
    if requirement.passes(identity) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %identity.id(),
            role_slug = identity.role_slug(),
            requirement = ?requirement,
            "Authorization denied"
        );
        Err(AppError::Forbidden(requirement.denial_message()))
    }
}
