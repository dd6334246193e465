//! Integration tests for `GET /previous-images`.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get, test_env, test_env_with_page_size};

fn seed(env: &common::TestEnv, name: &str, sidecar: Option<&str>) {
    std::fs::write(env.media_dir.join(name), b"media bytes").unwrap();
    if let Some(json) = sidecar {
        std::fs::write(env.media_dir.join(format!("{name}.json")), json).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Test: listing pairs media with sidecar metadata, newest first
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_is_newest_first_with_metadata() {
    let env = test_env(vec![]);
    seed(&env, "older.png", Some(r#"{"prompt":"a cat","seed":7}"#));
    tokio::time::sleep(Duration::from_millis(5)).await;
    seed(&env, "newer.mp4", None);

    let response = get(env.app.clone(), "/previous-images").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0]["url"], "/saved_images/newer.mp4");
    assert_eq!(entries[0]["content_type"], "video/mp4");
    assert_eq!(entries[0]["metadata"], serde_json::json!({}));
    assert!(entries[0]["createdAt"].is_string());

    assert_eq!(entries[1]["url"], "/saved_images/older.png");
    assert_eq!(entries[1]["content_type"], "image/png");
    assert_eq!(entries[1]["metadata"]["prompt"], "a cat");
    assert_eq!(entries[1]["metadata"]["seed"], 7);
}

// ---------------------------------------------------------------------------
// Test: corrupt sidecars degrade to empty metadata, not errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_sidecar_degrades_to_empty_metadata() {
    let env = test_env(vec![]);
    seed(&env, "a.png", Some("{truncated"));

    let response = get(env.app.clone(), "/previous-images").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["metadata"], serde_json::json!({}));
}

// ---------------------------------------------------------------------------
// Test: the configured page size caps the listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_is_capped_at_page_size() {
    let env = test_env_with_page_size(vec![], 3);
    for i in 0..5 {
        seed(&env, &format!("img_{i}.png"), None);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let response = get(env.app.clone(), "/previous-images").await;
    let body = body_json(response).await;

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    // The newest three survive.
    assert_eq!(entries[0]["url"], "/saved_images/img_4.png");
    assert_eq!(entries[2]["url"], "/saved_images/img_2.png");
}

// ---------------------------------------------------------------------------
// Test: an empty gallery is an empty array, not an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_gallery_is_empty_array() {
    let env = test_env(vec![]);

    let response = get(env.app.clone(), "/previous-images").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!([]));
}
