mod common;

use anyhow::Result;
use reqwest::StatusCode;

fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[tokio::test]
async fn unauthenticated_agency_page_redirects_to_landing() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let agency_id = uuid::Uuid::new_v4();
    let res = client
        .get(format!("{}/agency/{}", server.base_url, agency_id))
        .send()
        .await?;

    // No session: landing redirect regardless of the agency id in the path
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/"));
    Ok(())
}

#[tokio::test]
async fn unauthenticated_agency_picker_redirects_to_landing() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/agency", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/"));
    Ok(())
}

#[tokio::test]
async fn expired_or_garbage_session_is_treated_as_unauthenticated() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/agency/{}", server.base_url, uuid::Uuid::new_v4()))
        .header("authorization", "Bearer garbage")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/"));
    Ok(())
}
