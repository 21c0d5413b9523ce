//! Password hashing, token issuance, and request authentication.
//!
//! Tokens are HS256 JWTs carrying the account id and role. Handlers receive
//! the caller's identity through the [`AuthUser`] extractor parameter; there
//! is no ambient "current user" lookup anywhere else in the service.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;
use crate::Config;

// ---

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token for `user_id` with the configured secret and TTL.
pub fn issue_token(user_id: Uuid, role: Role, config: &Config) -> Result<String, AppError> {
    // ---
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(i64::from(config.token_ttl_hours))).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

/// Decode and validate a token. Any failure (bad signature, expired,
/// malformed) collapses to the same client-facing rejection.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    // ---
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(AppError::internal)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash).map_err(AppError::internal)
}

// ---

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Reject callers outside `role` with a 403.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        // ---
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<(PgPool, Config)> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &(PgPool, Config),
    ) -> Result<Self, Self::Rejection> {
        // ---
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::InvalidToken)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::InvalidToken)?;
        let claims = verify_token(token, &state.1.jwt_secret)?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn test_config() -> Config {
        Config {
            db_url: "postgres://localhost/unused".to_string(),
            db_pool_max: 1,
            port: 0,
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_token_round_trip() {
        // ---
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = issue_token(user_id, Role::Farmer, &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Farmer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        // ---
        let config = test_config();
        let token = issue_token(Uuid::new_v4(), Role::Admin, &config).unwrap();

        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // ---
        let config = test_config();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::Farmer,
            iat: (Utc::now() - Duration::hours(2)).timestamp(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config.jwt_secret).is_err());
    }

    #[test]
    fn test_password_hash_verifies() {
        // ---
        let hash = hash_password("irrigation1", 4).unwrap();

        assert!(verify_password("irrigation1", &hash).unwrap());
        assert!(!verify_password("irrigation2", &hash).unwrap());
    }

    #[test]
    fn test_role_guard() {
        // ---
        let farmer = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Farmer,
        };

        assert!(farmer.require_role(Role::Farmer).is_ok());
        assert!(matches!(
            farmer.require_role(Role::Admin),
            Err(AppError::Forbidden)
        ));
    }
}
