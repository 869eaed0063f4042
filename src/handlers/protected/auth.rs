use axum::extract::State;
use axum::Extension;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{self, UserProfile};
use crate::state::AppState;

/// GET /api/auth/whoami - the loaded profile for the current session:
/// user, owning agency with navigation, sub accounts, permission grants.
pub async fn whoami(
    Extension(auth_user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<UserProfile> {
    let profile = user_service::get_auth_user_details(&state.pool, &auth_user.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("No user profile for this session"))?;

    Ok(ApiResponse::success(profile))
}
