use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Agency, Plan, SubAccount, Subscription};
use crate::services::ServiceError;

const AGENCY_COLUMNS: &str = "id, name, company_email, company_phone, logo, address, city, \
                              zip_code, state, country, goal, white_label, customer_id, \
                              connect_account_id, created_at, updated_at";

/// Incoming agency record for the create-or-update operation. The id is
/// chosen by the caller (form-generated), which is what makes the upsert
/// keyed by primary identifier possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencyUpsert {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub company_email: String,
    pub company_phone: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub goal: Option<i32>,
    pub white_label: Option<bool>,
    pub customer_id: Option<String>,
    pub connect_account_id: Option<String>,
}

impl AgencyUpsert {
    /// An agency cannot be provisioned without a billing contact.
    pub fn missing_billing_contact(&self) -> bool {
        self.company_email.trim().is_empty()
    }
}

/// Partial update for an existing agency; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgencyUpdate {
    pub name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub goal: Option<i32>,
    pub white_label: Option<bool>,
    pub customer_id: Option<String>,
    pub connect_account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgencyDetails {
    #[serde(flatten)]
    pub agency: Agency,
    pub sub_accounts: Vec<SubAccount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedAgency {
    pub agency: Agency,
    /// Sub accounts removed by the cascade, reported with the delete
    pub sub_accounts: Vec<SubAccount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgencySubscription {
    pub customer_id: String,
    pub subscriptions: Vec<Subscription>,
}

/// The default navigation seeded for every new agency: name, icon, link
/// suffix under `/agency/{id}`.
const DEFAULT_SIDEBAR: [(&str, &str, &str); 6] = [
    ("Dashboard", "category", ""),
    ("Launchpad", "clipboardIcon", "/launchpad"),
    ("Billing", "payment", "/billing"),
    ("Settings", "settings", "/settings"),
    ("Sub Accounts", "person", "/all-subaccounts"),
    ("Team", "shield", "/team"),
];

/// Materialize the default sidebar entries for an agency id.
pub fn default_sidebar_options(agency_id: Uuid) -> Vec<(String, String, String)> {
    DEFAULT_SIDEBAR
        .iter()
        .map(|(name, icon, suffix)| {
            (
                name.to_string(),
                icon.to_string(),
                format!("/agency/{}{}", agency_id, suffix),
            )
        })
        .collect()
}

/// Create-or-update an agency, keyed by its id.
///
/// Returns `Ok(None)` without touching the database when the record has no
/// billing contact email. On create, attaches the invoking user by email
/// and seeds the six default sidebar options in the same transaction, so
/// partial seeding is never observable. The optional plan becomes the
/// initial subscription row.
pub async fn upsert_agency(
    pool: &PgPool,
    record: AgencyUpsert,
    plan: Option<Plan>,
) -> Result<Option<Agency>, ServiceError> {
    if record.missing_billing_contact() {
        warn!("Agency upsert skipped: no billing contact email (id={})", record.id);
        return Ok(None);
    }

    let mut tx = pool.begin().await?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM agencies WHERE id = $1 FOR UPDATE")
        .bind(record.id)
        .fetch_optional(&mut *tx)
        .await?;

    let agency = if existing.is_some() {
        update_in_tx(&mut tx, &record).await?
    } else {
        let agency = create_in_tx(&mut tx, &record).await?;

        // Attach the invoking user by the billing contact email
        sqlx::query("UPDATE users SET agency_id = $1, updated_at = now() WHERE email = $2")
            .bind(agency.id)
            .bind(&record.company_email)
            .execute(&mut *tx)
            .await?;

        for (name, icon, link) in default_sidebar_options(agency.id) {
            sqlx::query(
                "INSERT INTO sidebar_options (name, icon, link, agency_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(name)
            .bind(icon)
            .bind(link)
            .bind(agency.id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(plan) = plan {
            sqlx::query("INSERT INTO subscriptions (agency_id, plan) VALUES ($1, $2)")
                .bind(agency.id)
                .bind(plan)
                .execute(&mut *tx)
                .await?;
        }

        info!("Provisioned agency {} ({})", agency.name, agency.id);
        agency
    };

    tx.commit().await?;
    Ok(Some(agency))
}

async fn create_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &AgencyUpsert,
) -> Result<Agency, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(&format!(
        "INSERT INTO agencies (id, name, company_email, company_phone, logo, address, city, \
                               zip_code, state, country, goal, white_label, customer_id, \
                               connect_account_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 5), COALESCE($12, true), \
                 COALESCE($13, ''), $14)
         RETURNING {AGENCY_COLUMNS}"
    ))
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.company_email)
    .bind(&record.company_phone)
    .bind(&record.logo)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.zip_code)
    .bind(&record.state)
    .bind(&record.country)
    .bind(record.goal)
    .bind(record.white_label)
    .bind(&record.customer_id)
    .bind(&record.connect_account_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(agency)
}

async fn update_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    record: &AgencyUpsert,
) -> Result<Agency, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(&format!(
        "UPDATE agencies
         SET name = $2, company_email = $3, company_phone = $4, logo = $5, address = $6, \
             city = $7, zip_code = $8, state = $9, country = $10, \
             goal = COALESCE($11, goal), white_label = COALESCE($12, white_label), \
             customer_id = COALESCE($13, customer_id), \
             connect_account_id = COALESCE($14, connect_account_id), \
             updated_at = now()
         WHERE id = $1
         RETURNING {AGENCY_COLUMNS}"
    ))
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.company_email)
    .bind(&record.company_phone)
    .bind(&record.logo)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.zip_code)
    .bind(&record.state)
    .bind(&record.country)
    .bind(record.goal)
    .bind(record.white_label)
    .bind(&record.customer_id)
    .bind(&record.connect_account_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(agency)
}

/// Agency with its sub accounts; `Ok(None)` when the agency does not exist.
pub async fn get_agency_details(
    pool: &PgPool,
    agency_id: Uuid,
) -> Result<Option<AgencyDetails>, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(&format!(
        "SELECT {AGENCY_COLUMNS} FROM agencies WHERE id = $1"
    ))
    .bind(agency_id)
    .fetch_optional(pool)
    .await?;

    let Some(agency) = agency else {
        return Ok(None);
    };

    let sub_accounts = sub_accounts_of(pool, agency_id).await?;

    Ok(Some(AgencyDetails { agency, sub_accounts }))
}

pub async fn update_agency_details(
    pool: &PgPool,
    agency_id: Uuid,
    update: AgencyUpdate,
) -> Result<Agency, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(&format!(
        "UPDATE agencies
         SET name = COALESCE($2, name), company_email = COALESCE($3, company_email), \
             company_phone = COALESCE($4, company_phone), logo = COALESCE($5, logo), \
             address = COALESCE($6, address), city = COALESCE($7, city), \
             zip_code = COALESCE($8, zip_code), state = COALESCE($9, state), \
             country = COALESCE($10, country), goal = COALESCE($11, goal), \
             white_label = COALESCE($12, white_label), \
             customer_id = COALESCE($13, customer_id), \
             connect_account_id = COALESCE($14, connect_account_id), \
             updated_at = now()
         WHERE id = $1
         RETURNING {AGENCY_COLUMNS}"
    ))
    .bind(agency_id)
    .bind(&update.name)
    .bind(&update.company_email)
    .bind(&update.company_phone)
    .bind(&update.logo)
    .bind(&update.address)
    .bind(&update.city)
    .bind(&update.zip_code)
    .bind(&update.state)
    .bind(&update.country)
    .bind(update.goal)
    .bind(update.white_label)
    .bind(&update.customer_id)
    .bind(&update.connect_account_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", agency_id)))?;

    Ok(agency)
}

/// Delete an agency. The database cascade removes sub accounts, sidebar
/// options, notifications, invitations and subscriptions; the sub accounts
/// taken down with it are reported back as part of the same operation.
pub async fn delete_agency(pool: &PgPool, agency_id: Uuid) -> Result<DeletedAgency, ServiceError> {
    let mut tx = pool.begin().await?;

    let sub_accounts = sqlx::query_as::<_, SubAccount>(
        "SELECT id, agency_id, name, company_email, created_at, updated_at
         FROM sub_accounts WHERE agency_id = $1",
    )
    .bind(agency_id)
    .fetch_all(&mut *tx)
    .await?;

    let agency = sqlx::query_as::<_, Agency>(&format!(
        "DELETE FROM agencies WHERE id = $1 RETURNING {AGENCY_COLUMNS}"
    ))
    .bind(agency_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", agency_id)))?;

    tx.commit().await?;

    info!(
        "Deleted agency {} with {} sub account(s)",
        agency_id,
        sub_accounts.len()
    );
    Ok(DeletedAgency { agency, sub_accounts })
}

/// Billing identifiers for an agency: customer id plus subscription rows.
pub async fn get_agency_subscription(
    pool: &PgPool,
    agency_id: Uuid,
) -> Result<Option<AgencySubscription>, ServiceError> {
    let customer: Option<(String,)> = sqlx::query_as("SELECT customer_id FROM agencies WHERE id = $1")
        .bind(agency_id)
        .fetch_optional(pool)
        .await?;

    let Some((customer_id,)) = customer else {
        return Ok(None);
    };

    let subscriptions = sqlx::query_as::<_, Subscription>(
        "SELECT id, agency_id, plan, price_id, active, current_period_end, created_at, updated_at
         FROM subscriptions WHERE agency_id = $1 ORDER BY created_at DESC",
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(AgencySubscription { customer_id, subscriptions }))
}

pub async fn update_agency_connected_id(
    pool: &PgPool,
    agency_id: Uuid,
    connect_account_id: &str,
) -> Result<Agency, ServiceError> {
    let agency = sqlx::query_as::<_, Agency>(&format!(
        "UPDATE agencies SET connect_account_id = $2, updated_at = now()
         WHERE id = $1
         RETURNING {AGENCY_COLUMNS}"
    ))
    .bind(agency_id)
    .bind(connect_account_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", agency_id)))?;

    Ok(agency)
}

pub(crate) async fn sub_accounts_of(
    pool: &PgPool,
    agency_id: Uuid,
) -> Result<Vec<SubAccount>, ServiceError> {
    let sub_accounts = sqlx::query_as::<_, SubAccount>(
        "SELECT id, agency_id, name, company_email, created_at, updated_at
         FROM sub_accounts WHERE agency_id = $1 ORDER BY created_at",
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    Ok(sub_accounts)
}
