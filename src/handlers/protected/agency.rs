use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::{RoleSet, AGENCY_STAFF};
use crate::database::models::notification::NotificationWithUser;
use crate::database::models::{Agency, Plan};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::agency_service::{
    self, AgencyDetails, AgencySubscription, AgencyUpdate, AgencyUpsert, DeletedAgency,
};
use crate::services::notification_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertQuery {
    pub plan: Option<Plan>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectedAccountRequest {
    pub connect_account_id: String,
}

/// POST /api/agency - create-or-update an agency.
///
/// A record without a billing contact email is a no-op; the envelope then
/// carries a null payload rather than an error.
pub async fn upsert(
    Extension(auth_user): Extension<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<UpsertQuery>,
    Json(record): Json<AgencyUpsert>,
) -> ApiResult<Option<Agency>> {
    require_role(&auth_user, AGENCY_STAFF)?;

    let agency = agency_service::upsert_agency(&state.pool, record, query.plan).await?;
    Ok(ApiResponse::success(agency))
}

/// GET /api/agency/:agency_id - agency details including its sub accounts
pub async fn details(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
) -> ApiResult<AgencyDetails> {
    let details = agency_service::get_agency_details(&state.pool, agency_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Agency {} not found", agency_id)))?;

    Ok(ApiResponse::success(details))
}

/// PUT /api/agency/:agency_id - partial update of agency details
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Json(update): Json<AgencyUpdate>,
) -> ApiResult<Agency> {
    require_role(&auth_user, AGENCY_STAFF)?;

    let agency = agency_service::update_agency_details(&state.pool, agency_id, update).await?;

    // Activity trail for the info bar; a failed write never fails the update
    if let Err(e) = notification_service::save_notification(
        &state.pool,
        agency_id,
        auth_user.user_id,
        "Updated agency information",
        None,
    )
    .await
    {
        tracing::warn!("Failed to record notification for agency {}: {}", agency_id, e);
    }

    Ok(ApiResponse::success(agency))
}

/// DELETE /api/agency/:agency_id - delete the agency; the response reports
/// the sub accounts removed by the cascade
pub async fn delete(
    Extension(auth_user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
) -> ApiResult<DeletedAgency> {
    require_role(&auth_user, AGENCY_STAFF)?;

    let deleted = agency_service::delete_agency(&state.pool, agency_id).await?;
    Ok(ApiResponse::success(deleted))
}

/// GET /api/agency/:agency_id/subscription - billing identifiers
pub async fn subscription(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
) -> ApiResult<AgencySubscription> {
    let subscription = agency_service::get_agency_subscription(&state.pool, agency_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Agency {} not found", agency_id)))?;

    Ok(ApiResponse::success(subscription))
}

/// PUT /api/agency/:agency_id/connected-account - store the connected
/// payments account id
pub async fn connected_account(
    Extension(auth_user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
    Json(request): Json<ConnectedAccountRequest>,
) -> ApiResult<Agency> {
    require_role(&auth_user, AGENCY_STAFF)?;

    let agency =
        agency_service::update_agency_connected_id(&state.pool, agency_id, &request.connect_account_id)
            .await?;
    Ok(ApiResponse::success(agency))
}

/// GET /api/agency/:agency_id/notifications - info-bar notifications
pub async fn notifications(
    State(state): State<AppState>,
    Path(agency_id): Path<Uuid>,
) -> ApiResult<Vec<NotificationWithUser>> {
    let notifications = notification_service::get_notifications(&state.pool, agency_id).await?;
    Ok(ApiResponse::success(notifications))
}

fn require_role(auth_user: &AuthUser, permitted: RoleSet) -> Result<(), ApiError> {
    if !permitted.contains(auth_user.role) {
        return Err(ApiError::forbidden(
            "This operation requires an agency owner or admin role",
        ));
    }
    Ok(())
}
