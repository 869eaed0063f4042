use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Agency, Permission, Role, SidebarOption, SubAccount, User};
use crate::services::ServiceError;

const USER_COLUMNS: &str = "id, name, email, avatar_url, role, agency_id, created_at, updated_at";

/// The loaded profile behind every gated page: user, owning agency with its
/// navigation, sub accounts with theirs, and permission grants.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub agency: Option<AgencyProfile>,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgencyProfile {
    #[serde(flatten)]
    pub agency: Agency,
    pub sidebar_options: Vec<SidebarOption>,
    pub sub_accounts: Vec<SubAccountProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubAccountProfile {
    #[serde(flatten)]
    pub sub_account: SubAccount,
    pub sidebar_options: Vec<SidebarOption>,
}

/// Upsert the application user row at sign-up. An existing row keeps its
/// role; only the display name is refreshed.
pub async fn init_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: Role,
) -> Result<User, ServiceError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, role)
         VALUES ($1, $2, $3)
         ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, updated_at = now()
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Load the full profile for a verified email.
///
/// `Ok(None)` means no matching user row; callers treat that the same as
/// "not authenticated". The visible navigation is assembled fresh on every
/// call, never cached.
pub async fn get_auth_user_details(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserProfile>, ServiceError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, email, sub_account_id, access FROM permissions WHERE email = $1",
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    let agency = match user.agency_id {
        Some(agency_id) => load_agency_profile(pool, agency_id).await?,
        None => None,
    };

    Ok(Some(UserProfile { user, agency, permissions }))
}

async fn load_agency_profile(
    pool: &PgPool,
    agency_id: Uuid,
) -> Result<Option<AgencyProfile>, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(
        "SELECT id, name, company_email, company_phone, logo, address, city, zip_code, state, \
                country, goal, white_label, customer_id, connect_account_id, created_at, updated_at
         FROM agencies WHERE id = $1",
    )
    .bind(agency_id)
    .fetch_optional(pool)
    .await?;

    let Some(agency) = agency else {
        return Ok(None);
    };

    let sidebar_options = sqlx::query_as::<_, SidebarOption>(
        "SELECT id, name, icon, link, agency_id, sub_account_id, created_at
         FROM sidebar_options WHERE agency_id = $1 ORDER BY created_at",
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    let sub_accounts = crate::services::agency_service::sub_accounts_of(pool, agency_id).await?;

    let sub_account_ids: Vec<Uuid> = sub_accounts.iter().map(|s| s.id).collect();
    let sub_options = sqlx::query_as::<_, SidebarOption>(
        "SELECT id, name, icon, link, agency_id, sub_account_id, created_at
         FROM sidebar_options WHERE sub_account_id = ANY($1) ORDER BY created_at",
    )
    .bind(&sub_account_ids)
    .fetch_all(pool)
    .await?;

    let mut profiles = Vec::with_capacity(sub_accounts.len());
    for sub_account in sub_accounts {
        let sidebar_options = sub_options
            .iter()
            .filter(|o| o.sub_account_id == Some(sub_account.id))
            .cloned()
            .collect();
        profiles.push(SubAccountProfile {
            sub_account,
            sidebar_options,
        });
    }

    Ok(Some(AgencyProfile {
        agency,
        sidebar_options,
        sub_accounts: profiles,
    }))
}
