use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::access::{self, GateSubject, AGENCY_STAFF};
use crate::database::models::notification::NotificationWithUser;
use crate::database::models::{Role, SidebarOption};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, OptionalSession};
use crate::services::user_service::UserProfile;
use crate::services::{notification_service, user_service};
use crate::services::invitation_service;
use crate::state::AppState;

/// Everything the agency frame needs to render: sidebar navigation, the
/// info bar (notifications + role) and the loaded profile. The content
/// slot is the caller's.
#[derive(Debug, Serialize)]
pub struct AgencyFrame {
    pub agency_id: Uuid,
    /// Union of the agency's sidebar options and every sub account's,
    /// assembled fresh for this render
    pub navigation: Vec<SidebarOption>,
    pub notifications: Vec<NotificationWithUser>,
    pub role: Role,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct AgencyPickerPayload {
    pub agency_id: Option<Uuid>,
    pub needs_onboarding: bool,
}

/// GET /agency - the agency picker / onboarding entry.
///
/// Unauthenticated visitors land back on the marketing page; authenticated
/// users without an agency get the onboarding marker.
pub async fn agency_picker(
    OptionalSession(session): OptionalSession,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let Some(session) = session else {
        return Ok(Redirect::temporary("/").into_response());
    };

    let profile = user_service::get_auth_user_details(&state.pool, &session.email).await?;
    let Some(profile) = profile else {
        // Session token without a user row: treat as not authenticated
        return Ok(Redirect::temporary("/").into_response());
    };

    let agency_id = profile.user.agency_id;
    Ok(ApiResponse::success(AgencyPickerPayload {
        agency_id,
        needs_onboarding: agency_id.is_none(),
    })
    .into_response())
}

/// GET /agency/:agency_id - the gated agency frame.
///
/// Session resolution, then profile load and invitation verification run
/// concurrently, then the access gate decides redirect-vs-render. Only an
/// admitted request fetches notifications.
pub async fn agency_layout(
    OptionalSession(session): OptionalSession,
    Path(agency_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let subject = match &session {
        Some(session) => {
            let (profile, resolved) = tokio::join!(
                user_service::get_auth_user_details(&state.pool, &session.email),
                invitation_service::verify_invitation(&state.pool, &session.email),
            );
            match profile? {
                Some(profile) => Some((profile, resolved?)),
                None => None,
            }
        }
        None => None,
    };

    let decision = access::evaluate(
        subject.as_ref().map(|(profile, resolved)| GateSubject {
            role: profile.user.role,
            resolved_agency_id: *resolved,
        }),
        Some(agency_id),
        AGENCY_STAFF,
    );

    if let Some(location) = decision.location() {
        return Ok(Redirect::temporary(location).into_response());
    }

    // Proceed implies a loaded profile with a resolved agency
    let Some((profile, Some(resolved_agency_id))) = subject else {
        return Err(ApiError::internal_server_error(
            "Access gate admitted an unresolved request",
        ));
    };

    // Notification failures degrade to an empty list rather than blocking
    // the render
    let notifications = match notification_service::get_notifications(&state.pool, resolved_agency_id).await
    {
        Ok(notifications) => notifications,
        Err(e) => {
            tracing::warn!("Notification fetch failed for agency {}: {}", resolved_agency_id, e);
            Vec::new()
        }
    };

    let navigation = visible_navigation(&profile);

    Ok(ApiResponse::success(AgencyFrame {
        agency_id,
        navigation,
        notifications,
        role: profile.user.role,
        user: profile,
    })
    .into_response())
}

/// The user's visible navigation: agency sidebar options plus every sub
/// account's, in that order.
fn visible_navigation(profile: &UserProfile) -> Vec<SidebarOption> {
    let Some(agency) = &profile.agency else {
        return Vec::new();
    };

    let mut navigation = agency.sidebar_options.clone();
    for sub_account in &agency.sub_accounts {
        navigation.extend(sub_account.sidebar_options.iter().cloned());
    }
    navigation
}
