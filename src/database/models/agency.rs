use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant root. Owns sub accounts, sidebar options, notifications and
/// billing identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub company_email: String,
    pub company_phone: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub goal: i32,
    pub white_label: bool,
    pub customer_id: String,
    pub connect_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
