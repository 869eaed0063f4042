use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::validate_jwt;
use crate::database::models::Role;

/// Identity of the current session as the page tier sees it.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Session resolver for page routes: reads the ambient request and yields
/// a user identity or nothing. Never rejects — a missing, malformed or
/// expired token is simply "nothing", so the access gate (not the
/// extractor) decides where the request goes.
pub struct OptionalSession(pub Option<SessionUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(resolve_session(&parts.headers)))
    }
}

fn resolve_session(headers: &HeaderMap) -> Option<SessionUser> {
    let token = bearer_token(headers).or_else(|| session_cookie(headers))?;

    let claims = validate_jwt(&token).ok()?;
    Some(SessionUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("session="))
        .map(|t| t.to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use axum::http::HeaderValue;

    #[test]
    fn no_headers_resolves_to_nothing() {
        assert!(resolve_session(&HeaderMap::new()).is_none());
    }

    #[test]
    fn garbage_token_resolves_to_nothing() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer nonsense"));
        assert!(resolve_session(&headers).is_none());
    }

    #[test]
    fn valid_bearer_token_resolves_identity() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt(Claims::new(
            user_id,
            "admin@agency.test".to_string(),
            Role::AgencyAdmin,
        ))
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let session = resolve_session(&headers).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email, "admin@agency.test");
        assert_eq!(session.role, Role::AgencyAdmin);
    }

    #[test]
    fn session_cookie_resolves_identity() {
        let token = generate_jwt(Claims::new(
            Uuid::new_v4(),
            "owner@agency.test".to_string(),
            Role::AgencyOwner,
        ))
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("theme=dark; session={}", token)).unwrap(),
        );

        assert!(resolve_session(&headers).is_some());
    }
}
