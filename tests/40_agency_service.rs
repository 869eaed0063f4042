// Database-backed service properties. These connect to DATABASE_URL and
// skip gracefully when no database is reachable (e.g. bare CI).

use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use aksara_api::database::models::Role;
use aksara_api::services::agency_service::{self, AgencyUpsert};
use aksara_api::services::{invitation_service, user_service};

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .ok()?;

    sqlx::migrate!("./migrations").run(&pool).await.ok()?;
    Some(pool)
}

fn agency_record(id: Uuid, company_email: &str) -> AgencyUpsert {
    AgencyUpsert {
        id,
        name: format!("Agency {}", id.simple()),
        company_email: company_email.to_string(),
        company_phone: None,
        logo: None,
        address: None,
        city: None,
        zip_code: None,
        state: None,
        country: None,
        goal: None,
        white_label: None,
        customer_id: None,
        connect_account_id: None,
    }
}

#[tokio::test]
async fn upsert_without_billing_contact_writes_nothing() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let id = Uuid::new_v4();
    let result = agency_service::upsert_agency(&pool, agency_record(id, "   "), None).await?;
    assert!(result.is_none());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agencies WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count.0, 0);
    Ok(())
}

#[tokio::test]
async fn agency_creation_seeds_exactly_six_sidebar_options() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let id = Uuid::new_v4();
    let email = format!("billing+{}@agency.test", id.simple());
    let created = agency_service::upsert_agency(&pool, agency_record(id, &email), None)
        .await?
        .expect("agency created");
    assert_eq!(created.id, id);

    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sidebar_options WHERE agency_id = $1 ORDER BY created_at",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let names: Vec<&str> = names.iter().map(|(n,)| n.as_str()).collect();
    assert_eq!(
        names,
        ["Dashboard", "Launchpad", "Billing", "Settings", "Sub Accounts", "Team"]
    );
    Ok(())
}

#[tokio::test]
async fn second_upsert_updates_in_place_without_reseeding() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let id = Uuid::new_v4();
    let email = format!("billing+{}@agency.test", id.simple());
    agency_service::upsert_agency(&pool, agency_record(id, &email), None)
        .await?
        .expect("agency created");

    let mut record = agency_record(id, &email);
    record.name = "Renamed Agency".to_string();
    let updated = agency_service::upsert_agency(&pool, record, None)
        .await?
        .expect("agency updated");
    assert_eq!(updated.name, "Renamed Agency");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sidebar_options WHERE agency_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count.0, 6, "update must not reseed the default sidebar");
    Ok(())
}

#[tokio::test]
async fn deleting_an_agency_removes_its_sub_accounts() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let id = Uuid::new_v4();
    let email = format!("billing+{}@agency.test", id.simple());
    agency_service::upsert_agency(&pool, agency_record(id, &email), None)
        .await?
        .expect("agency created");

    for name in ["North Branch", "South Branch"] {
        sqlx::query("INSERT INTO sub_accounts (agency_id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&pool)
            .await?;
    }

    let deleted = agency_service::delete_agency(&pool, id).await?;
    assert_eq!(deleted.sub_accounts.len(), 2);

    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sub_accounts WHERE agency_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining.0, 0, "cascade must remove both sub accounts");
    Ok(())
}

#[tokio::test]
async fn profile_loader_assembles_nested_navigation() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let id = Uuid::new_v4();
    let email = format!("owner+{}@agency.test", id.simple());

    // User first so agency creation can attach it by billing email
    let user = user_service::init_user(&pool, "Test Owner", &email, Role::AgencyOwner).await?;
    agency_service::upsert_agency(&pool, agency_record(id, &email), None)
        .await?
        .expect("agency created");

    let sub_account_id: (Uuid,) = sqlx::query_as(
        "INSERT INTO sub_accounts (agency_id, name) VALUES ($1, 'Branch') RETURNING id",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO sidebar_options (name, icon, link, sub_account_id)
         VALUES ('Launchpad', 'clipboardIcon', '/subaccount/launchpad', $1)",
    )
    .bind(sub_account_id.0)
    .execute(&pool)
    .await?;

    let profile = user_service::get_auth_user_details(&pool, &email)
        .await?
        .expect("profile loaded");

    assert_eq!(profile.user.id, user.id);
    let agency = profile.agency.expect("agency attached");
    assert_eq!(agency.agency.id, id);
    assert_eq!(agency.sidebar_options.len(), 6);
    assert_eq!(agency.sub_accounts.len(), 1);
    assert_eq!(agency.sub_accounts[0].sidebar_options.len(), 1);
    Ok(())
}

#[tokio::test]
async fn pending_invitation_resolves_and_attaches_the_user() -> Result<()> {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: database unavailable");
        return Ok(());
    };

    let agency_id = Uuid::new_v4();
    let owner_email = format!("owner+{}@agency.test", agency_id.simple());
    agency_service::upsert_agency(&pool, agency_record(agency_id, &owner_email), None)
        .await?
        .expect("agency created");

    let invitee = format!("admin+{}@agency.test", Uuid::new_v4().simple());
    user_service::init_user(&pool, "Invited Admin", &invitee, Role::SubaccountUser).await?;
    invitation_service::create_invitation(&pool, agency_id, &invitee, Role::AgencyAdmin).await?;

    let resolved = invitation_service::verify_invitation(&pool, &invitee).await?;
    assert_eq!(resolved, Some(agency_id));

    // Acceptance attached the user and consumed the invitation
    let profile = user_service::get_auth_user_details(&pool, &invitee)
        .await?
        .expect("profile loaded");
    assert_eq!(profile.user.agency_id, Some(agency_id));
    assert_eq!(profile.user.role, Role::AgencyAdmin);

    let again = invitation_service::verify_invitation(&pool, &invitee).await?;
    assert_eq!(again, Some(agency_id), "falls back to the user's own agency");
    Ok(())
}
