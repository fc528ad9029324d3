mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

const TS: &str = "2020-01-01T00:00:00Z";

fn video_form(filename: &str, contents: &'static [u8]) -> Form {
    Form::new().part("videofile", Part::bytes(contents).file_name(filename.to_string()))
}

#[tokio::test]
async fn upload_stores_file_under_fresh_name() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "upload").await?;
    let created = common::create_pdd(&server, &token, json!({ "name": "S", "timestamp": TS })).await?;

    let res = server
        .client
        .post(server.url(&format!("/pdds/{}/upload-video", created["id"])))
        .bearer_auth(&token)
        .multipart(video_form("holiday clip.MP4", b"not really a video"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body.as_object().map(|o| o.len()), Some(2));

    let url = body["videofile"].as_str().unwrap_or_default().to_string();
    assert!(url.starts_with("/media/uploads/videos/"), "{}", url);
    assert!(url.ends_with(".MP4"), "{}", url);
    assert!(!url.contains("holiday"));

    let stored = server.media.path().join(url.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(&stored)?, b"not really a video");

    // Served back from the media mount
    let served = server.client.get(server.url(&url)).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), b"not really a video");
    Ok(())
}

#[tokio::test]
async fn upload_without_file_leaves_record_unchanged() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "nofile").await?;
    let created = common::create_pdd(&server, &token, json!({ "name": "S", "timestamp": TS })).await?;
    let path = format!("/pdds/{}/upload-video", created["id"]);

    let first: Value = server
        .client
        .post(server.url(&path))
        .bearer_auth(&token)
        .multipart(video_form("a.mp4", b"first"))
        .send()
        .await?
        .json()
        .await?;

    let empty_form = Form::new().text("videofile", "");
    let requests = [
        server.client.post(server.url(&path)).multipart(empty_form),
        server.client.post(server.url(&path)).json(&json!({})),
        server.client.post(server.url(&path)).multipart(video_form("b.mp4", b"")),
    ];
    for request in requests {
        let res = request.bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert!(body["field_errors"]["videofile"].is_string(), "{}", body);
    }

    // The first upload is still in place
    let stored = server
        .media
        .path()
        .join(first["videofile"].as_str().unwrap_or_default().trim_start_matches("/media/"));
    assert_eq!(std::fs::read(&stored)?, b"first");
    Ok(())
}

#[tokio::test]
async fn replacing_upload_removes_previous_file() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "replace").await?;
    let created = common::create_pdd(&server, &token, json!({ "name": "S", "timestamp": TS })).await?;
    let path = format!("/pdds/{}/upload-video", created["id"]);

    let mut urls = Vec::new();
    for contents in [&b"one"[..], &b"two"[..]] {
        let body: Value = server
            .client
            .post(server.url(&path))
            .bearer_auth(&token)
            .multipart(video_form("clip.webm", contents))
            .send()
            .await?
            .json()
            .await?;
        urls.push(body["videofile"].as_str().unwrap_or_default().to_string());
    }
    assert_ne!(urls[0], urls[1]);

    let on_disk = |url: &str| server.media.path().join(url.trim_start_matches("/media/"));
    assert!(!on_disk(&urls[0]).exists());
    assert_eq!(std::fs::read(on_disk(&urls[1]))?, b"two");
    Ok(())
}

#[tokio::test]
async fn upload_to_missing_or_foreign_pdd_is_not_found() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let alice = common::register(&server, "alice").await?;
    let bob = common::register(&server, "bob").await?;
    let created = common::create_pdd(&server, &alice, json!({ "name": "S", "timestamp": TS })).await?;

    let res = server
        .client
        .post(server.url(&format!("/pdds/{}/upload-video", created["id"])))
        .bearer_auth(&bob)
        .multipart(video_form("a.mp4", b"data"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Unknown id wins over a missing file
    let res = server
        .client
        .post(server.url(&format!("/pdds/{}/upload-video", i64::MAX)))
        .bearer_auth(&alice)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(!server.media.path().join("uploads/videos").exists());
    Ok(())
}

#[tokio::test]
async fn malformed_body_to_missing_pdd_is_not_found() -> Result<()> {
    let Some(server) = common::server_with_database().await? else {
        return Ok(());
    };
    let token = common::register(&server, "garbage").await?;

    let res = server
        .client
        .post(server.url(&format!("/pdds/{}/upload-video", i64::MAX)))
        .bearer_auth(&token)
        .header(reqwest::header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body("garbage")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "NOT_FOUND");

    // The same body on an owned record fails on parsing instead
    let created = common::create_pdd(&server, &token, json!({ "name": "S", "timestamp": TS })).await?;
    let res = server
        .client
        .post(server.url(&format!("/pdds/{}/upload-video", created["id"])))
        .bearer_auth(&token)
        .header(reqwest::header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body("garbage")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
