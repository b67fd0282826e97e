//! 身份解析服务
//! 凭证 -> 用户 -> 角色（连同权限）一次性解析；任何环节缺失都失败关闭

use crate::{
    auth::jwt::JwtService,
    authz::Identity,
    error::AppError,
    repository::{RoleRepository, UserRepository},
};
use sqlx::PgPool;
use std::sync::Arc;

pub struct IdentityResolver {
    db: PgPool,
    jwt_service: Arc<JwtService>,
}

impl IdentityResolver {
    pub fn new(db: PgPool, jwt_service: Arc<JwtService>) -> Self {
        Self { db, jwt_service }
    }

    /// 解析 bearer 凭证为完整身份。
    /// 纯读操作：不更新 last_seen 之类的状态。
    pub async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.jwt_service.validate_token(token)?;
        let identity_id = JwtService::identity_id(&claims)?;

        // 令牌有效但用户已删除：拒绝，而不是半填充的身份
        let user = UserRepository::new(self.db.clone())
            .find_by_id(&identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        // 角色连同权限集合在这里一次取齐；下游判定不再查询存储。
        // 角色行缺失意味着悬空引用，按数据异常处理，绝不放行。
        let role = RoleRepository::new(self.db.clone())
            .find_with_permissions(&user.role_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    user_id = %user.id,
                    role_id = %user.role_id,
                    "User references a role that no longer exists"
                );
                AppError::NotFound("Role".to_string())
            })?;

        Ok(Identity { user, role })
    }
}
