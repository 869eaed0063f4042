use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::notification::NotificationWithUser;
use crate::services::ServiceError;

/// Notifications for an agency, newest first, joined with the user that
/// triggered each one.
pub async fn get_notifications(
    pool: &PgPool,
    agency_id: Uuid,
) -> Result<Vec<NotificationWithUser>, ServiceError> {
    let notifications = sqlx::query_as::<_, NotificationWithUser>(
        "SELECT n.id, n.body, n.agency_id, n.sub_account_id, n.user_id, n.created_at,
                u.name AS user_name, u.avatar_url AS user_avatar_url
         FROM notifications n
         JOIN users u ON u.id = n.user_id
         WHERE n.agency_id = $1
         ORDER BY n.created_at DESC",
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// Record an activity notification against an agency.
pub async fn save_notification(
    pool: &PgPool,
    agency_id: Uuid,
    user_id: Uuid,
    body: &str,
    sub_account_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    sqlx::query(
        "INSERT INTO notifications (body, agency_id, sub_account_id, user_id)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(body)
    .bind(agency_id)
    .bind(sub_account_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}
