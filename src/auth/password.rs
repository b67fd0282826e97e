//! 密码散列与策略校验

use crate::{config::AppConfig, error::AppError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

/// Argon2 密码散列器
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// 散列密码
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
    }

    /// 校验密码；失败一律返回无效凭证
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<(), AppError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AppError::Internal(format!("stored password hash is corrupt: {}", e)))?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::BadRequest("Invalid email or password".to_string()))
    }

    /// 按配置校验密码策略
    pub fn validate_password_policy(password: &str, config: &AppConfig) -> Result<(), AppError> {
        let policy = &config.security;

        if password.len() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                policy.password_min_length
            )));
        }

        if policy.password_require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AppError::Validation(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
