//! 角色注册表服务
//! 创建（slug 推导 + 去重后缀）、更新（原子权限替换）、删除（引用检查）

use crate::{
    error::AppError,
    models::role::*,
    realtime::{AppEvent, EventSink},
    repository::RoleRepository,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// slug 后缀推导的尝试上限；耗尽视作不变量被破坏
const SLUG_MAX_ATTEMPTS: u32 = 1000;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

pub struct RoleService {
    db: PgPool,
    events: Arc<dyn EventSink>,
}

impl RoleService {
    pub fn new(db: PgPool, events: Arc<dyn EventSink>) -> Self {
        Self { db, events }
    }

    /// 创建角色：名称大小写不敏感唯一，slug 由名称推导并用 -N 后缀去重
    pub async fn create(&self, req: &CreateRoleRequest) -> Result<Role, AppError> {
        let repo = RoleRepository::new(self.db.clone());
        let name = req.name.trim();

        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Name is required to create a role".to_string(),
            ));
        }

        if repo.find_by_name_ci(name).await?.is_some() {
            return Err(AppError::Conflict("Role name already exists".to_string()));
        }

        let base = slugify(name);
        if base.is_empty() {
            return Err(AppError::BadRequest(
                "Role name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let taken: HashSet<String> = repo.slugs_with_prefix(&base).await?.into_iter().collect();
        let slug = next_free_slug(&base, |candidate| taken.contains(candidate))?;

        let role = repo.create(name, &slug).await?;

        tracing::info!(role_id = %role.id, slug = %role.slug, "Role created");
        self.emit("roleCreated", &role);

        Ok(role)
    }

    /// 分页列出角色；非管理员只看到策略允许的可见集合
    pub async fn list(
        &self,
        query: &ListQuery,
        visibility: Option<&'static str>,
    ) -> Result<PagedResponse<Role>, AppError> {
        let repo = RoleRepository::new(self.db.clone());
        let (roles, total) = repo.list(query, visibility).await?;
        let (page, limit) = query.normalize();

        Ok(PagedResponse {
            total,
            page,
            limit,
            data: roles,
        })
    }

    /// 角色详情（连同权限集合）
    pub async fn get(&self, id: &Uuid) -> Result<RoleWithPermissions, AppError> {
        RoleRepository::new(self.db.clone())
            .find_with_permissions(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))
    }

    /// 更新角色。名称/slug 改名撞到其他角色 -> 409；
    /// permissions 提供时整表原子替换。
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateRoleRequest,
    ) -> Result<RoleWithPermissions, AppError> {
        let repo = RoleRepository::new(self.db.clone());

        let current = repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        let name = req.name.as_deref().map(str::trim).unwrap_or(&current.name);
        let slug = req.slug.as_deref().map(str::trim).unwrap_or(&current.slug);
        let status = req.status.as_deref().unwrap_or(&current.status);

        if !ROLE_STATUSES.contains(&status) {
            return Err(AppError::BadRequest(
                "Invalid status value. Allowed: 'active', 'inactive'".to_string(),
            ));
        }

        if !name.eq_ignore_ascii_case(&current.name) {
            if let Some(existing) = repo.find_by_name_ci(name).await? {
                if existing.id != id {
                    return Err(AppError::Conflict("Role name already exists".to_string()));
                }
            }
        }

        if !slug.eq_ignore_ascii_case(&current.slug) && repo.slug_exists(slug).await? {
            return Err(AppError::Conflict("Role slug already exists".to_string()));
        }

        let updated = repo
            .update(id, name, slug, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        // 权限表替换是原子的：全部生效或全部不生效
        let permissions = match &req.permissions {
            Some(grants) => repo.replace_permissions(id, grants).await?,
            None => repo.get_role_permissions(id).await?,
        };

        let result = RoleWithPermissions {
            role: updated,
            permissions,
        };

        tracing::info!(role_id = %id, "Role updated");
        self.emit("roleUpdated", &result);

        Ok(result)
    }

    /// 删除角色。仍被用户引用时拒绝（保证所有身份的角色可解析）。
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let repo = RoleRepository::new(self.db.clone());

        let role = repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        let referencing = repo.count_referencing_users(id).await?;
        if referencing > 0 {
            return Err(AppError::Conflict(format!(
                "Role is still assigned to {} user(s)",
                referencing
            )));
        }

        repo.delete(id).await?;

        tracing::info!(role_id = %id, slug = %role.slug, "Role deleted");
        self.emit("roleDeleted", &role);

        Ok(())
    }

    /// 事件发送失败不影响请求流程
    fn emit<T: serde::Serialize>(&self, kind: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.events.emit(AppEvent::new(kind, value)),
            Err(e) => tracing::warn!(kind, error = %e, "Failed to serialize event payload"),
        }
    }
}

/// 名称 -> slug：小写、仅保留 ASCII 字母数字、其余折叠为连字符
pub fn slugify(name: &str) -> String {
    let lower: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii())
        .collect();

    NON_ALNUM.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// 从 base 开始找第一个未被占用的 slug：base, base-1, base-2, ...
/// 尝试次数有上限，耗尽返回 Internal 而不是无界循环。
pub fn next_free_slug(
    base: &str,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String, AppError> {
    if !is_taken(base) {
        return Ok(base.to_string());
    }

    for counter in 1..=SLUG_MAX_ATTEMPTS {
        let candidate = format!("{}-{}", base, counter);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(AppError::Internal(format!(
        "slug generation exhausted after {} attempts for base '{}'",
        SLUG_MAX_ATTEMPTS, base
    )))
}
