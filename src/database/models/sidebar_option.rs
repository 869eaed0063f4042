use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named navigation link attached to exactly one agency or sub account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SidebarOption {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub link: String,
    pub agency_id: Option<Uuid>,
    pub sub_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
