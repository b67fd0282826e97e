//! User repository (数据库访问层)

use crate::{error::AppError, models::role::ListQuery, models::user::*};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据 ID 查找用户
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据邮箱查找用户
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据用户名查找用户
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 创建用户
    pub async fn create(
        &self,
        req: &SignupRequest,
        password_hash: &str,
        role_id: Uuid,
        freelancer_status: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, email, password_hash, role_id, freelancer_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.username)
        .bind(&req.email)
        .bind(password_hash)
        .bind(role_id)
        .bind(freelancer_status)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// 分页列出用户
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<User>, i64), AppError> {
        let (_, limit) = query.normalize();
        let search = query.search.clone().unwrap_or_default();
        let pattern = format!("%{}%", search);

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1 = '' OR name ILIKE $2 OR username ILIKE $2 OR email ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&search)
        .bind(&pattern)
        .bind(limit as i64)
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM users WHERE ($1 = '' OR name ILIKE $2 OR username ILIKE $2 OR email ILIKE $2)",
        )
        .bind(&search)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?
        .get(0);

        Ok((users, total))
    }

    /// 更新用户
    pub async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.status)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 更新自由职业者审批状态
    pub async fn update_freelancer_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET freelancer_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 删除用户
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
