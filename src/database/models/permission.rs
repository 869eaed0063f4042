use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-sub-account access grant keyed by the user's email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub email: String,
    pub sub_account_id: Uuid,
    pub access: bool,
}
