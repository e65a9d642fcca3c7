#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;
use vyom_api::auth::jwt::{Claims, JwtConfig};
use vyom_api::config::ServerConfig;
use vyom_api::media::cloudinary::CloudinaryConfig;
use vyom_api::router::build_app_router;
use vyom_api::state::AppState;
use vyom_core::media::{MediaAsset, MediaError, MediaKind, MediaStore, MediaUpload};
use vyom_core::types::DbId;
use vyom_db::models::user::CreateUser;
use vyom_db::repositories::UserRepo;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store_timeout_secs: 5,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        media: CloudinaryConfig {
            cloud_name: "test".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            root_folder: "vyom-test".into(),
            api_base: "http://127.0.0.1:9".into(),
        },
    }
}

// ---------------------------------------------------------------------------
// Fake media store
// ---------------------------------------------------------------------------

/// In-process [`MediaStore`] that records every upload and delete.
#[derive(Default)]
pub struct FakeMediaStore {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    /// Folders whose uploads fail.
    pub fail_folders: Mutex<Vec<String>>,
    /// Make every delete fail.
    pub fail_deletes: Mutex<bool>,
}

impl FakeMediaStore {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_uploads_to(&self, folder: &str) {
        self.fail_folders.lock().unwrap().push(folder.to_string());
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<MediaAsset, MediaError> {
        if self.fail_folders.lock().unwrap().contains(&upload.folder) {
            return Err(MediaError::Unavailable("upload refused".into()));
        }
        let public_id = format!("{}/{}", upload.folder, upload.file_name);
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(MediaAsset {
            url: format!("https://media.test/{public_id}"),
            public_id,
            duration: (upload.kind == MediaKind::Video).then_some(12.5),
            kind: upload.kind,
        })
    }

    async fn delete(&self, public_id: &str, _kind: MediaKind) -> Result<(), MediaError> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(MediaError::Unavailable("delete refused".into()));
        }
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router (production middleware stack) over
/// `pool`, returning the fake media store so tests can inspect it.
pub fn build_test_app_with_media(pool: PgPool) -> (Router, Arc<FakeMediaStore>) {
    let config = test_config();
    let media = Arc::new(FakeMediaStore::default());
    let state = AppState::new(pool, config.clone(), media.clone());
    (build_app_router(state, &config), media)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_media(pool).0
}

/// Mint a bearer token for `user_id`, as the auth service would.
pub fn token_for(user_id: DbId) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now + 900,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn create_user(pool: &PgPool, username: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.into(),
            full_name: format!("{username} Example"),
            avatar: format!("https://media.test/{username}.png"),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn authed(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = authed(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, authed(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn patch_empty(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, authed(Method::PATCH, uri, token).body(Body::empty()).unwrap()).await
}

/// A part of a multipart form: `(name, file_name, bytes)`; text fields
/// have no file name.
pub type FormPart<'a> = (&'a str, Option<&'a str>, &'a [u8]);

const BOUNDARY: &str = "vyom-test-boundary";

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    parts: &[FormPart<'_>],
) -> Response<Body> {
    let request = authed(method, uri, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

/// Publish a video with default files through the HTTP surface and return
/// its id.
pub async fn publish(app: Router, token: &str, title: &str) -> DbId {
    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        Some(token),
        &[
            ("title", None, title.as_bytes()),
            ("description", None, "a test video".as_bytes()),
            ("videoFile", Some("clip.mp4"), b"\x00\x01video".as_slice()),
            ("thumbnail", Some("thumb.png"), b"\x89PNG".as_slice()),
        ],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().parse().unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
