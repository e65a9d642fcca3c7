//! Integration tests for the `/api/v1/videos` resource.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, build_test_app_with_media, create_user, delete, get, patch_empty, publish,
    send_multipart, token_for,
};
use sqlx::PgPool;

async fn video_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_requires_authentication(pool: PgPool) {
    let (app, media) = build_test_app_with_media(pool);
    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        None,
        &[("title", None, "x".as_bytes())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(media.uploaded().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_uploads_both_files_and_creates_record(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let token = token_for(owner);
    let (app, media) = build_test_app_with_media(pool.clone());

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        Some(&token),
        &[
            ("title", None, "  Sunset timelapse  ".as_bytes()),
            ("description", None, "golden hour".as_bytes()),
            ("videoFile", Some("sunset.mp4"), b"\x00\x01".as_slice()),
            ("thumbnail", Some("sunset.png"), b"\x89PNG".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let video = &json["data"];
    assert_eq!(video["title"], "Sunset timelapse");
    assert_eq!(video["duration"], 12.5);
    assert_eq!(video["views"], 0);
    assert_eq!(video["is_published"], true);
    assert_eq!(video["owner_id"], owner.to_string());
    assert_eq!(video["video_file"]["public_id"], "videos/sunset.mp4");
    assert_eq!(video["thumbnail"]["url"], "https://media.test/thumbnails/sunset.png");

    assert_eq!(
        sorted(media.uploaded()),
        vec!["thumbnails/sunset.png", "videos/sunset.mp4"]
    );
    assert!(media.deleted().is_empty());
    assert_eq!(video_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_without_thumbnail_is_rejected_before_upload(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let (app, media) = build_test_app_with_media(pool.clone());

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        Some(&token_for(owner)),
        &[
            ("title", None, "t".as_bytes()),
            ("description", None, "d".as_bytes()),
            ("videoFile", Some("clip.mp4"), b"\x00".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(media.uploaded().is_empty());
    assert_eq!(video_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_with_blank_title_is_rejected(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let (app, _media) = build_test_app_with_media(pool);

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        Some(&token_for(owner)),
        &[
            ("title", None, "   ".as_bytes()),
            ("description", None, "d".as_bytes()),
            ("videoFile", Some("clip.mp4"), b"\x00".as_slice()),
            ("thumbnail", Some("t.png"), b"\x00".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_thumbnail_upload_removes_uploaded_video(pool: PgPool) {
    let owner = create_user(&pool, "alice").await;
    let (app, media) = build_test_app_with_media(pool.clone());
    media.fail_uploads_to("thumbnails");

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        Some(&token_for(owner)),
        &[
            ("title", None, "t".as_bytes()),
            ("description", None, "d".as_bytes()),
            ("videoFile", Some("clip.mp4"), b"\x00".as_slice()),
            ("thumbnail", Some("t.png"), b"\x00".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "MEDIA_UNAVAILABLE");
    assert_eq!(media.deleted(), vec!["videos/clip.mp4"]);
    assert_eq!(video_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_filters_by_owner_newest_first_with_owner_projection(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let (app, _media) = build_test_app_with_media(pool);

    publish(app.clone(), &token_for(alice), "first").await;
    publish(app.clone(), &token_for(bob), "other").await;
    publish(app.clone(), &token_for(alice), "second").await;

    let response = get(app, &format!("/api/v1/videos?userId={alice}&page=1&limit=10")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["page"], 1);
    assert_eq!(data["has_next_page"], false);
    let items = data["items"].as_array().unwrap();
    let titles: Vec<&str> = items.iter().map(|v| v["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["second", "first"]);
    assert_eq!(items[0]["owner"]["username"], "alice");
    assert!(items[0].get("score").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_fuzzy_search_tolerates_typos(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (app, _media) = build_test_app_with_media(pool);
    let token = token_for(alice);

    publish(app.clone(), &token, "Mountain biking").await;
    publish(app.clone(), &token, "Cooking pasta").await;

    let json = body_json(get(app, "/api/v1/videos?query=mountian").await).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Mountain biking");
    assert!(items[0]["score"].as_f64().unwrap() > 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_rejects_malformed_user_id(pool: PgPool) {
    let (app, _media) = build_test_app_with_media(pool);
    let response = get(app, "/api/v1/videos?userId=65f1c2a9b8e4d3c2a1f0e9d8").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_rejects_non_numeric_page(pool: PgPool) {
    let (app, _media) = build_test_app_with_media(pool);
    let response = get(app, "/api/v1/videos?page=abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_clamps_oversized_page_size(pool: PgPool) {
    let (app, _media) = build_test_app_with_media(pool);
    let json = body_json(get(app, "/api/v1/videos?limit=500").await).await;

    assert_eq!(json["data"]["page_size"], 50);
    assert_eq!(json["data"]["total"], 0);
    assert_eq!(json["data"]["total_pages"], 0);
}

// ---------------------------------------------------------------------------
// Get / update / toggle / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_video_by_id(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let (app, _media) = build_test_app_with_media(pool);
    let id = publish(app.clone(), &token_for(alice), "clip").await;

    let response = get(app.clone(), &format!("/api/v1/videos/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "clip");

    let response = get(app.clone(), "/api/v1/videos/not-an-id").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app, &format!("/api/v1/videos/{}", uuid::Uuid::now_v7())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_is_owner_only(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    let (app, media) = build_test_app_with_media(pool);
    let id = publish(app.clone(), &token_for(alice), "clip").await;

    let response = send_multipart(
        app,
        Method::PATCH,
        &format!("/api/v1/videos/{id}"),
        Some(&token_for(mallory)),
        &[
            ("title", None, "hijacked".as_bytes()),
            ("thumbnail", Some("evil.png"), b"\x00".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!media.uploaded().contains(&"thumbnails/evil.png".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_replaces_thumbnail_and_retires_old_one(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let token = token_for(alice);
    let (app, media) = build_test_app_with_media(pool);
    let id = publish(app.clone(), &token, "clip").await;

    let response = send_multipart(
        app,
        Method::PATCH,
        &format!("/api/v1/videos/{id}"),
        Some(&token),
        &[
            ("title", None, "renamed".as_bytes()),
            ("thumbnail", Some("fresh.png"), b"\x00".as_slice()),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "renamed");
    assert_eq!(json["data"]["description"], "a test video");
    assert_eq!(json["data"]["thumbnail"]["public_id"], "thumbnails/fresh.png");
    assert_eq!(media.deleted(), vec!["thumbnails/thumb.png"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_without_fields_is_rejected(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let token = token_for(alice);
    let (app, _media) = build_test_app_with_media(pool);
    let id = publish(app.clone(), &token, "clip").await;

    let response = send_multipart(
        app,
        Method::PATCH,
        &format!("/api/v1/videos/{id}"),
        Some(&token),
        &[],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn toggle_publish_hides_video_from_feed(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let token = token_for(alice);
    let (app, _media) = build_test_app_with_media(pool);
    let id = publish(app.clone(), &token, "clip").await;

    let response = patch_empty(app.clone(), &format!("/api/v1/videos/{id}/publish"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_published"], false);

    let json = body_json(get(app, "/api/v1/videos").await).await;
    assert_eq!(json["data"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_media_then_record(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let mallory = create_user(&pool, "mallory").await;
    let token = token_for(alice);
    let (app, media) = build_test_app_with_media(pool.clone());
    let id = publish(app.clone(), &token, "clip").await;

    let response = delete(app.clone(), &format!("/api/v1/videos/{id}"), Some(&token_for(mallory))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(app.clone(), &format!("/api/v1/videos/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        sorted(media.deleted()),
        vec!["thumbnails/thumb.png", "videos/clip.mp4"]
    );
    assert_eq!(video_count(&pool).await, 0);

    let response = get(app, &format!("/api/v1/videos/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_keeps_record_when_media_store_fails(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let token = token_for(alice);
    let (app, media) = build_test_app_with_media(pool.clone());
    let id = publish(app.clone(), &token, "clip").await;
    media.fail_deletes();

    let response = delete(app, &format!("/api/v1/videos/{id}"), Some(&token)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(video_count(&pool).await, 1);
}
