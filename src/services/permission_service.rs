//! 权限管理服务
//! 权限独立于角色增删改，但创建/改挂载时校验目标角色存在

use crate::{
    error::AppError,
    models::role::*,
    realtime::{AppEvent, EventSink},
    repository::RoleRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct PermissionService {
    db: PgPool,
    events: Arc<dyn EventSink>,
}

impl PermissionService {
    pub fn new(db: PgPool, events: Arc<dyn EventSink>) -> Self {
        Self { db, events }
    }

    /// 创建权限；目标角色必须存在
    pub async fn create(&self, req: &CreatePermissionRequest) -> Result<Permission, AppError> {
        let repo = RoleRepository::new(self.db.clone());

        if repo.find_by_id(&req.role_id).await?.is_none() {
            return Err(AppError::BadRequest("Role not found.".to_string()));
        }

        let permission = repo
            .create_permission(req.role_id, &req.action, &req.resource)
            .await?;

        tracing::info!(
            permission_id = %permission.id,
            role_id = %permission.role_id,
            action = %permission.action,
            resource = %permission.resource,
            "Permission created"
        );
        self.emit("permissionCreated", &permission);

        Ok(permission)
    }

    /// 分页列出权限
    pub async fn list(&self, query: &ListQuery) -> Result<PagedResponse<Permission>, AppError> {
        let repo = RoleRepository::new(self.db.clone());
        let (permissions, total) = repo.list_permissions(query).await?;
        let (page, limit) = query.normalize();

        Ok(PagedResponse {
            total,
            page,
            limit,
            data: permissions,
        })
    }

    /// 权限详情
    pub async fn get(&self, id: &Uuid) -> Result<Permission, AppError> {
        RoleRepository::new(self.db.clone())
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Permission".to_string()))
    }

    /// 更新权限；换挂角色时校验新角色存在
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdatePermissionRequest,
    ) -> Result<Permission, AppError> {
        let repo = RoleRepository::new(self.db.clone());

        let current = repo
            .find_permission(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Permission".to_string()))?;

        let role_id = req.role_id.unwrap_or(current.role_id);
        if role_id != current.role_id && repo.find_by_id(&role_id).await?.is_none() {
            return Err(AppError::BadRequest("Role not found.".to_string()));
        }

        let updated = repo
            .update_permission(id, role_id, &req.action, &req.resource)
            .await?
            .ok_or_else(|| AppError::NotFound("Permission".to_string()))?;

        tracing::info!(permission_id = %id, "Permission updated");
        self.emit("permissionUpdated", &updated);

        Ok(updated)
    }

    /// 删除权限
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let repo = RoleRepository::new(self.db.clone());

        let deleted = repo.delete_permission(id).await?;
        if !deleted {
            return Err(AppError::NotFound("Permission".to_string()));
        }

        tracing::info!(permission_id = %id, "Permission deleted");
        self.events
            .emit(AppEvent::new("permissionDeleted", serde_json::json!({ "id": id })));

        Ok(())
    }

    fn emit<T: serde::Serialize>(&self, kind: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.events.emit(AppEvent::new(kind, value)),
            Err(e) => tracing::warn!(kind, error = %e, "Failed to serialize event payload"),
        }
    }
}
