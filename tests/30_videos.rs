mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_and_list_videos() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "videos").await?;

    let res = server
        .client
        .post(server.url("/videos"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Jurassic Park" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["title"], "Jurassic Park");

    let listed: Value = server
        .client
        .get(server.url("/videos"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed, json!([{ "id": created["id"], "title": "Jurassic Park" }]));
    Ok(())
}

#[tokio::test]
async fn videos_are_listed_by_title_descending() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "order").await?;
    for title in ["Alien", "Casablanca", "Brazil"] {
        common::create_video(&server, &token, title).await?;
    }

    let listed: Vec<Value> = server
        .client
        .get(server.url("/videos"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let titles: Vec<&str> = listed.iter().filter_map(|v| v["title"].as_str()).collect();
    assert_eq!(titles, ["Casablanca", "Brazil", "Alien"]);
    Ok(())
}

#[tokio::test]
async fn title_is_required() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "title").await?;

    for payload in [json!({}), json!({ "title": "" }), json!({ "title": "   " })] {
        let res = server
            .client
            .post(server.url("/videos"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        let body: Value = res.json().await?;
        assert!(body["field_errors"]["title"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn owner_comes_from_token_not_payload() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let alice = common::register(&server, "alice").await?;
    let bob = common::register(&server, "bob").await?;

    let res = server
        .client
        .post(server.url("/videos"))
        .bearer_auth(&alice)
        .json(&json!({ "title": "Mine", "user": 1, "user_id": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let bobs: Vec<Value> = server
        .client
        .get(server.url("/videos"))
        .bearer_auth(&bob)
        .send()
        .await?
        .json()
        .await?;
    assert!(bobs.is_empty());
    Ok(())
}
