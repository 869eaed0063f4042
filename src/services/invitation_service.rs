use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Invitation, Role};
use crate::services::ServiceError;

/// Resolve the tenant for a session email.
///
/// A pending invitation wins: it is accepted here (the user is attached to
/// the inviting agency and the row marked accepted) and its agency id
/// returned. Otherwise the user's own agency id, if any.
pub async fn verify_invitation(pool: &PgPool, email: &str) -> Result<Option<Uuid>, ServiceError> {
    let invitation = sqlx::query_as::<_, Invitation>(
        "SELECT id, email, agency_id, role, status, created_at
         FROM invitations
         WHERE email = $1 AND status = 'PENDING'",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    if let Some(invitation) = invitation {
        let agency_id = accept_invitation(pool, &invitation).await?;
        return Ok(Some(agency_id));
    }

    let own: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT agency_id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(own.and_then(|(agency_id,)| agency_id))
}

/// Attach the invited user to the agency and mark the invitation accepted,
/// atomically.
async fn accept_invitation(pool: &PgPool, invitation: &Invitation) -> Result<Uuid, ServiceError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE users SET agency_id = $1, role = $2, updated_at = now() WHERE email = $3")
        .bind(invitation.agency_id)
        .bind(invitation.role)
        .bind(&invitation.email)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE invitations SET status = 'ACCEPTED' WHERE id = $1")
        .bind(invitation.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Accepted invitation for {} into agency {}",
        invitation.email, invitation.agency_id
    );
    Ok(invitation.agency_id)
}

/// Create a pending invitation into an agency.
pub async fn create_invitation(
    pool: &PgPool,
    agency_id: Uuid,
    email: &str,
    role: Role,
) -> Result<Invitation, ServiceError> {
    let invitation = sqlx::query_as::<_, Invitation>(
        "INSERT INTO invitations (email, agency_id, role)
         VALUES ($1, $2, $3)
         RETURNING id, email, agency_id, role, status, created_at",
    )
    .bind(email)
    .bind(agency_id)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServiceError::Conflict(format!("{} is already invited to this agency", email))
        }
        _ => ServiceError::Database(e),
    })?;

    Ok(invitation)
}
