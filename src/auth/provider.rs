use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, JwtError};
use crate::config;
use crate::database::models::Role;

/// Errors surfaced by the auth collaborator. The message of the
/// credential-facing variants is shown to the user verbatim.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// An issued session: signed token plus the identity baked into it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_in: u64,
}

/// Seam to the authentication collaborator. One instance is constructed at
/// startup and shared through `AppState`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create the user identity (new sign-ups default to agency owner),
    /// store credentials and issue a session.
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Verify credentials and issue a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Build the OAuth authorize-redirect URL for a named provider.
    fn authorize_url(&self, provider: &str) -> Result<Url, AuthError>;
}

/// Database-backed provider: Argon2id PHC hashes in `user_credentials`,
/// HS256 session tokens.
pub struct LocalAuthProvider {
    pool: PgPool,
}

impl LocalAuthProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn issue_session(&self, user_id: Uuid, email: &str, role: Role) -> Result<AuthSession, AuthError> {
        let token = generate_jwt(Claims::new(user_id, email.to_string(), role))?;
        Ok(AuthSession {
            token,
            user_id,
            email: email.to_string(),
            role,
            expires_in: config::config().security.jwt_expiry_hours * 3600,
        })
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let user = crate::services::user_service::init_user(&self.pool, name, email, Role::AgencyOwner)
            .await
            .map_err(|e| match e {
                crate::services::ServiceError::Database(err) => AuthError::Database(err),
                other => AuthError::Crypto(other.to_string()),
            })?;

        let hash = hash_password(password)?;

        let inserted = sqlx::query(
            "INSERT INTO user_credentials (email, password_hash)
             VALUES ($1, $2)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .bind(&hash)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AuthError::AlreadyRegistered);
        }

        tracing::info!("Registered credentials for {}", email);
        self.issue_session(user.id, email, user.role)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let row = sqlx::query_as::<_, (Uuid, Role, String)>(
            "SELECT u.id, u.role, c.password_hash
             FROM users u
             JOIN user_credentials c ON c.email = u.email
             WHERE u.email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        // Same error for unknown email and wrong password
        let (user_id, role, stored_hash) = row.ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &stored_hash)? {
            tracing::warn!("Failed sign-in attempt for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(user_id, email, role)
    }

    fn authorize_url(&self, provider: &str) -> Result<Url, AuthError> {
        let oauth = &config::config().oauth;
        match provider {
            "google" => {
                let mut url = Url::parse("https://accounts.google.com/o/oauth2/v2/auth")
                    .map_err(|e| AuthError::Crypto(e.to_string()))?;
                url.query_pairs_mut()
                    .append_pair("client_id", &oauth.google_client_id)
                    .append_pair("redirect_uri", &format!("{}/auth/callback", oauth.redirect_base))
                    .append_pair("response_type", "code")
                    .append_pair("scope", "openid email profile")
                    .append_pair("state", &Uuid::new_v4().to_string());
                Ok(url)
            }
            other => Err(AuthError::UnknownProvider(other.to_string())),
        }
    }
}

/// Hash a plaintext password into an Argon2id PHC-format string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on mismatch; `Err(AuthError::Crypto)` only when the
/// stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_a_crypto_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::Crypto(_))
        ));
    }
}
