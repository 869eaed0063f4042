use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::provider::AuthSession;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub user: SessionUserPayload,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionUserPayload {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<AuthSession> for SessionPayload {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: SessionUserPayload {
                id: session.user_id,
                email: session.email,
                role: session.role,
            },
            expires_in: session.expires_in,
        }
    }
}

/// POST /agency/sign-in - authenticate and receive a session token.
///
/// Required-field validation runs before the auth collaborator is invoked;
/// collaborator failures surface their message as-is.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<SessionPayload> {
    let mut field_errors = HashMap::new();
    require(&mut field_errors, "email", &payload.email);
    require(&mut field_errors, "password", &payload.password);
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Missing required fields",
            Some(field_errors),
        ));
    }

    let session = state.auth.sign_in(&payload.email, &payload.password).await?;

    tracing::info!("Signed in {}", session.email);
    Ok(ApiResponse::success(SessionPayload::from(session)))
}

/// POST /agency/sign-up - create an account and receive a session token.
///
/// New sign-ups become agency owners; the application user row is created
/// alongside the credentials.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> ApiResult<SessionPayload> {
    let mut field_errors = HashMap::new();
    require(&mut field_errors, "name", &payload.name);
    require(&mut field_errors, "email", &payload.email);
    require(&mut field_errors, "password", &payload.password);
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Missing required fields",
            Some(field_errors),
        ));
    }

    let session = state
        .auth
        .sign_up(&payload.name, &payload.email, &payload.password)
        .await?;

    tracing::info!("Signed up {}", session.email);
    Ok(ApiResponse::created(SessionPayload::from(session)))
}

/// GET /agency/oauth/:provider - redirect to the provider authorize URL
pub async fn oauth_redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let url = state.auth.authorize_url(&provider)?;
    Ok(Redirect::temporary(url.as_str()))
}

fn require(field_errors: &mut HashMap<String, String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        field_errors.insert(field.to_string(), "This field is required".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_flags_blank_fields_only() {
        let mut errors = HashMap::new();
        require(&mut errors, "email", "");
        require(&mut errors, "password", "   ");
        require(&mut errors, "name", "Dana");

        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(!errors.contains_key("name"));
    }
}
