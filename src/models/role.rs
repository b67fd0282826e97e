//! Role and permission domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: String, // active, inactive
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role 状态合法值
pub const ROLE_STATUSES: [&str; 2] = ["active", "inactive"];

/// Permission: 角色的一条 (action, resource) 授权
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub role_id: Uuid,
    pub action: String,
    pub resource: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role 连同其权限集合；授权判定只依赖这份快照，不再二次查询
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl RoleWithPermissions {
    /// (action, resource) 精确匹配查找
    pub fn has_permission(&self, action: &str, resource: &str) -> bool {
        self.permissions
            .iter()
            .any(|perm| perm.action == action && perm.resource == resource)
    }

    pub fn slug(&self) -> &str {
        &self.role.slug
    }
}

/// Create role request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 64, message = "Name is required to create a role"))]
    pub name: String,
}

/// Update role request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub slug: Option<String>,
    pub status: Option<String>,
    /// 若提供，整张权限表原子替换（全部生效或全部不生效）
    pub permissions: Option<Vec<PermissionGrant>>,
}

/// 权限授权项（嵌在角色更新或独立创建请求中）
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionGrant {
    #[validate(length(min = 1, max = 64))]
    pub action: String,
    #[validate(length(min = 1, max = 64))]
    pub resource: String,
}

/// Create permission request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    pub role_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub action: String,
    #[validate(length(min = 1, max = 64))]
    pub resource: String,
}

/// Update permission request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePermissionRequest {
    pub role_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub action: String,
    #[validate(length(min = 1, max = 64))]
    pub resource: String,
}

/// 列表查询参数（分页、搜索、排序）
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListQuery {
    /// 归一化分页参数，limit 上限 100
    pub fn normalize(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(10).clamp(1, 100);
        (page, limit)
    }

    /// 偏移量在 i64 里计算，极端 page 值不会回绕
    pub fn offset(&self) -> i64 {
        let (page, limit) = self.normalize();
        (i64::from(page) - 1) * i64::from(limit)
    }
}

/// 分页列表响应
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<T>,
}
