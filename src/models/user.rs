//! User domain models（授权相关子集）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 每个用户必须引用且仅引用一个 Role
    pub role_id: Uuid,
    pub is_verified: bool,
    pub status: String, // active, inactive, suspended
    /// 仅自由职业者账户使用: pending, approved, rejected
    pub freelancer_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const USER_STATUSES: [&str; 3] = ["active", "inactive", "suspended"];
pub const FREELANCER_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

/// 对外的用户响应（不含密码散列）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "roleId")]
    pub role_id: Uuid,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    pub status: String,
    #[serde(rename = "freelancerStatus")]
    pub freelancer_status: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
            is_verified: user.is_verified,
            status: user.status,
            freelancer_status: user.freelancer_status,
            created_at: user.created_at,
        }
    }
}

/// Signup request；角色通过 slug 选择（client 或 freelancer）
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    /// "client" 或 "freelancer"
    pub role: String,
}

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub status: Option<String>,
}

/// 管理员审批自由职业者
#[derive(Debug, Deserialize)]
pub struct FreelancerReviewRequest {
    /// "approved" 或 "rejected"
    pub decision: String,
}
