//! Role repository (角色与权限数据访问)

use crate::{error::AppError, models::role::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct RoleRepository {
    db: PgPool,
}

impl RoleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ==================== Roles ====================

    /// 分页列出角色，支持 name/slug 模糊搜索。
    /// visibility 是策略层给出的静态过滤片段（如 "status = 'active'"），
    /// 不接受调用方自由字符串。
    pub async fn list(
        &self,
        query: &ListQuery,
        visibility: Option<&'static str>,
    ) -> Result<(Vec<Role>, i64), AppError> {
        let (_, limit) = query.normalize();
        let search = query.search.clone().unwrap_or_default();
        let pattern = format!("%{}%", search);
        let order_by = sort_column(query, &["name", "slug", "status", "created_at"]);
        let filter = visibility.unwrap_or("TRUE");

        let sql = format!(
            r#"
            SELECT * FROM roles
            WHERE ($1 = '' OR name ILIKE $2 OR slug ILIKE $2) AND ({})
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            filter, order_by
        );

        let roles = sqlx::query_as::<_, Role>(&sql)
            .bind(&search)
            .bind(&pattern)
            .bind(limit as i64)
            .bind(query.offset())
            .fetch_all(&self.db)
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM roles WHERE ($1 = '' OR name ILIKE $2 OR slug ILIKE $2) AND ({})",
            filter
        );

        let total: i64 = sqlx::query(&count_sql)
            .bind(&search)
            .bind(&pattern)
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok((roles, total))
    }

    /// 根据 ID 查找角色
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// 根据 slug 查找角色
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// 大小写不敏感的名称查找
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// slug 是否已被占用
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM roles WHERE LOWER(slug) = LOWER($1)")
            .bind(slug)
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count > 0)
    }

    /// 取出等于 base 或以 "base-" 开头的所有 slug（后缀推导用）
    pub async fn slugs_with_prefix(&self, base: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT slug FROM roles WHERE slug = $1 OR slug LIKE $1 || '-%'")
            .bind(base)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
    }

    /// 创建角色
    pub async fn create(&self, name: &str, slug: &str) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, slug, status)
            VALUES ($1, $2, 'active')
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.db)
        .await?;

        Ok(role)
    }

    /// 更新角色基本字段
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
        status: &str,
    ) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = $2, slug = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 删除角色
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 仍引用该角色的用户数（删除前的引用检查）
    pub async fn count_referencing_users(&self, role_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.db)
            .await?
            .get(0);

        Ok(count)
    }

    // ==================== Permissions ====================

    /// 获取角色的所有权限
    pub async fn get_role_permissions(&self, role_id: Uuid) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE role_id = $1 ORDER BY resource, action",
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// 角色连同权限集合一次取出
    pub async fn find_with_permissions(
        &self,
        id: &Uuid,
    ) -> Result<Option<RoleWithPermissions>, AppError> {
        let Some(role) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let permissions = self.get_role_permissions(role.id).await?;

        Ok(Some(RoleWithPermissions { role, permissions }))
    }

    /// 原子替换角色的权限表：单事务内删旧插新，要么全部生效要么全不生效
    pub async fn replace_permissions(
        &self,
        role_id: Uuid,
        grants: &[PermissionGrant],
    ) -> Result<Vec<Permission>, AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        let mut replaced = Vec::with_capacity(grants.len());
        for grant in grants {
            let permission = sqlx::query_as::<_, Permission>(
                r#"
                INSERT INTO permissions (role_id, action, resource)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(role_id)
            .bind(grant.action.trim())
            .bind(grant.resource.trim())
            .fetch_one(&mut *tx)
            .await?;

            replaced.push(permission);
        }

        tx.commit().await?;

        Ok(replaced)
    }

    /// 分页列出权限，支持 action/resource 模糊搜索
    pub async fn list_permissions(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Permission>, i64), AppError> {
        let (_, limit) = query.normalize();
        let search = query.search.clone().unwrap_or_default();
        let pattern = format!("%{}%", search);
        let order_by = sort_column(query, &["action", "resource", "created_at"]);

        let sql = format!(
            r#"
            SELECT * FROM permissions
            WHERE ($1 = '' OR action ILIKE $2 OR resource ILIKE $2)
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            order_by
        );

        let permissions = sqlx::query_as::<_, Permission>(&sql)
            .bind(&search)
            .bind(&pattern)
            .bind(limit as i64)
            .bind(query.offset())
            .fetch_all(&self.db)
            .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM permissions WHERE ($1 = '' OR action ILIKE $2 OR resource ILIKE $2)",
        )
        .bind(&search)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?
        .get(0);

        Ok((permissions, total))
    }

    /// 根据 ID 查找权限
    pub async fn find_permission(&self, id: &Uuid) -> Result<Option<Permission>, AppError> {
        let permission =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(permission)
    }

    /// 创建权限
    pub async fn create_permission(
        &self,
        role_id: Uuid,
        action: &str,
        resource: &str,
    ) -> Result<Permission, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (role_id, action, resource)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(action.trim())
        .bind(resource.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(permission)
    }

    /// 更新权限
    pub async fn update_permission(
        &self,
        id: Uuid,
        role_id: Uuid,
        action: &str,
        resource: &str,
    ) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            UPDATE permissions
            SET role_id = $2, action = $3, resource = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role_id)
        .bind(action.trim())
        .bind(resource.trim())
        .fetch_optional(&self.db)
        .await?;

        Ok(permission)
    }

    /// 删除权限
    pub async fn delete_permission(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// 排序列白名单；非法输入回落到 created_at
fn sort_column(query: &ListQuery, allowed: &[&str]) -> String {
    let sort = query.sort.as_deref().unwrap_or("created_at");
    let column = if allowed.contains(&sort) { sort } else { "created_at" };
    let order = match query.order.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    format!("{} {}", column, order)
}
