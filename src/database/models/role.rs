use serde::{Deserialize, Serialize};

/// Capability tag on a user. Checked for membership at the access gate,
/// never as a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    AgencyOwner,
    AgencyAdmin,
    SubaccountUser,
    SubaccountGuest,
}

/// Priced tier optionally attached at agency provisioning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plan", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Starter,
    Basic,
    Unlimited,
}
