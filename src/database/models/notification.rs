use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub body: String,
    pub agency_id: Uuid,
    pub sub_account_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Notification joined with the user that triggered it, as rendered in
/// the info bar.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationWithUser {
    pub id: Uuid,
    pub body: String,
    pub agency_id: Uuid,
    pub sub_account_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_avatar_url: Option<String>,
}
