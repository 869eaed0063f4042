pub mod provider;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trip_preserves_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "owner@agency.test".to_string(), Role::AgencyOwner);
        let token = generate_jwt(claims).unwrap();

        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.email, "owner@agency.test");
        assert_eq!(decoded.role, Role::AgencyOwner);
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            validate_jwt("not-a-jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }
}
