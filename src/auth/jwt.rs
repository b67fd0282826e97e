//! JWT 签发与验证
//! 载荷为 {sub, iat, exp}；过期与无效是两类不同的 401

use crate::{config::AppConfig, error::AppError};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 令牌声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 身份 ID
    pub sub: String,
    /// 签发时间（Unix 秒）
    pub iat: i64,
    /// 过期时间（Unix 秒）
    pub exp: i64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
}

impl JwtService {
    /// 从配置构建；密钥合法性已在配置加载时验证
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        if secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_exp_secs: config.security.access_token_exp_secs,
        })
    }

    /// 签发访问令牌
    pub fn generate_token(&self, identity_id: &Uuid) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: identity_id.to_string(),
            iat: now,
            exp: now + self.access_token_exp_secs as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    /// 验证令牌；过期与其他失败区分返回
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(AppError::TokenExpired),
                _ => Err(AppError::TokenInvalid(e.to_string())),
            },
        }
    }

    /// 从已验证的声明中取出身份 ID
    pub fn identity_id(claims: &Claims) -> Result<Uuid, AppError> {
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::TokenInvalid("subject is not a valid id".to_string()))
    }

    pub fn access_token_exp_secs(&self) -> u64 {
        self.access_token_exp_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

    fn service() -> JwtService {
        JwtService {
            encoding_key: EncodingKey::from_secret(SECRET.as_bytes()),
            decoding_key: DecodingKey::from_secret(SECRET.as_bytes()),
            access_token_exp_secs: 3600,
        }
    }

    #[test]
    fn test_roundtrip() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.generate_token(&id).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(JwtService::identity_id(&claims).unwrap(), id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_distinct_from_invalid() {
        let svc = service();

        // 过期令牌：exp 在过去（超出默认 leeway）
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(svc.validate_token(&expired), Err(AppError::TokenExpired)));

        // 无效令牌：垃圾输入
        assert!(matches!(
            svc.validate_token("not.a.token"),
            Err(AppError::TokenInvalid(_))
        ));

        // 无效令牌：错误密钥签名
        let other_key = EncodingKey::from_secret(b"another-secret-key-also-32-characters!!");
        let forged = encode(
            &Header::default(),
            &Claims {
                sub: Uuid::new_v4().to_string(),
                iat: now,
                exp: now + 3600,
            },
            &other_key,
        )
        .unwrap();
        assert!(matches!(svc.validate_token(&forged), Err(AppError::TokenInvalid(_))));
    }

    #[test]
    fn test_bad_subject_rejected() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(JwtService::identity_id(&claims).is_err());
    }
}
