use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::database::models::Role;
use crate::error::ApiError;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware for the `/api` tier. Validates the token
/// and injects the user context; failures answer with the 401 envelope.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty session token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn rejects_missing_and_malformed_headers() {
        let empty = HeaderMap::new();
        assert!(extract_jwt_from_headers(&empty).is_err());

        let mut basic = HeaderMap::new();
        basic.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert!(extract_jwt_from_headers(&basic).is_err());

        let mut blank = HeaderMap::new();
        blank.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&blank).is_err());
    }

    #[test]
    fn accepts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer some.jwt.token"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "some.jwt.token");
    }
}
