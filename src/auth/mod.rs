use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::AppError;
use crate::users::model::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub is_super_admin: bool,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, roles: Vec<Role>, is_super_admin: bool) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            roles,
            is_super_admin,
            iss: security.jwt_issuer.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AppError> {
    let security = &config::config().security;
    encode_with_secret(claims, &security.jwt_secret)
}

pub fn validate_jwt(token: &str) -> Result<Claims, AppError> {
    let security = &config::config().security;
    decode_with_secret(token, &security.jwt_secret, &security.jwt_issuer)
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, AppError> {
    if secret.is_empty() {
        return Err(AppError::internal("JWT secret not configured"));
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT generation failed: {}", e)))
}

fn decode_with_secret(token: &str, secret: &str, issuer: &str) -> Result<Claims, AppError> {
    if secret.is_empty() {
        return Err(AppError::internal("JWT secret not configured"));
    }

    let mut validation = Validation::default();
    validation.set_issuer(&[issuer]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::authentication(format!("Invalid token: {}", e)))
}

/// Hashes a password with bcrypt at the configured cost.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn claims() -> Claims {
        let now = Utc::now();
        Claims {
            sub: Uuid::new_v4(),
            email: "inspector@ecogov.local".to_string(),
            roles: vec![Role::AirQuality],
            is_super_admin: false,
            iss: "ecogov-api".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        }
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let claims = claims();
        let token = encode_with_secret(&claims, "test-secret").unwrap();
        let decoded = decode_with_secret(&token, "test-secret", "ecogov-api").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, claims.email);
        assert_eq!(decoded.roles, vec![Role::AirQuality]);
        assert!(!decoded.is_super_admin);
    }

    #[test]
    fn wrong_secret_is_an_authentication_error() {
        let token = encode_with_secret(&claims(), "test-secret").unwrap();
        let err = decode_with_secret(&token, "other-secret", "ecogov-api").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = encode_with_secret(&claims(), "test-secret").unwrap();
        assert!(decode_with_secret(&token, "test-secret", "someone-else").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(encode_with_secret(&claims(), "").is_err());
    }
}
