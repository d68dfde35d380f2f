//! Shared helpers for the admin integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use admin::{AdminConfig, AppState, config::ServerConfig, create_router};
use auth::AuthConfig;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
    routing::post,
};
use common::{StorageConfig, StorageProvider, git::InMemoryGitHost};
use image::{DynamicImage, ImageFormat, RgbImage};
use media::{AssetLayout, MediaSettings};
use tower::ServiceExt;

pub const BRANCH: &str = "main";
const SECRET: &str = "admin-test-secret-admin-test-secret-admin-test-secret-admin-test";
const PASSWORD: &str = "Darkroom-Timer-400";
const BOUNDARY: &str = "portfolio-test-boundary";

fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| auth::hash_password(PASSWORD).unwrap())
}

pub fn config(storage: StorageConfig, build_hook_url: Option<String>) -> AdminConfig {
    AdminConfig {
        server: ServerConfig::default(),
        storage,
        layout: AssetLayout::default(),
        media: MediaSettings {
            full_max_width: 400,
            thumb_max_width: 100,
            ffmpeg_path: "/nonexistent/ffmpeg".to_string(),
            ..MediaSettings::default()
        },
        auth: AuthConfig {
            allowed_users: vec!["admin".to_string()],
            password_hash: Some(password_hash().to_string()),
            cookie_secret: Some(SECRET.to_string()),
            secure_cookie: false,
            ..AuthConfig::default()
        },
        build_hook_url,
    }
}

/// A router together with a logged-in session cookie
pub struct TestApp {
    pub router: Router,
    pub cookie: String,
}

impl TestApp {
    pub async fn new(config: AdminConfig, storage: StorageProvider) -> Self {
        let state = AppState::with_storage(&config, storage).unwrap();
        let router = create_router(state);
        let cookie = login(&router).await;
        Self { router, cookie }
    }

    /// App writing to a local working tree
    pub async fn local(root: &Path) -> Self {
        let config = config(StorageConfig::local(root), None);
        let storage = StorageProvider::from_config(&config.storage).unwrap();
        Self::new(config, storage).await
    }

    /// App publishing to an in-memory Git host
    pub async fn remote(host: Arc<InMemoryGitHost>, build_hook_url: Option<String>) -> Self {
        let config = config(StorageConfig::local("."), build_hook_url);
        Self::new(config, StorageProvider::remote(host, BRANCH)).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn json(&self, method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, &self.cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(&self, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, &self.cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub fn upload(&self, category: &str, featured: bool, files: &[Part<'_>]) -> Request<Body> {
        multipart_request(Some(&self.cookie), category, featured, files)
    }
}

async fn login(router: &Router) -> String {
    let body = serde_json::json!({"username": "admin", "password": PASSWORD});
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// One file part of a multipart upload
pub struct Part<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn new(filename: &'a str, content_type: &'a str, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            content_type,
            bytes,
        }
    }
}

pub fn multipart_request(
    cookie: Option<&str>,
    category: &str,
    featured: bool,
    files: &[Part<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    let mut text_field = |name: &str, value: &str| {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    };
    text_field("category", category);
    text_field("featured", if featured { "true" } else { "false" });

    for part in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.filename, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/admin/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, 90])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// Minimal record document as the site stores it
pub fn record(title: &str, image: &str, thumbnail: &str, order: i64) -> String {
    format!(
        "---\ntitle: {title}\nimage: {image}\nthumbnail: {thumbnail}\nwidth: 10\nheight: 10\nfeatured: false\ndate: 2025-01-0{}T00:00:00.000Z\norder: {order}\n---\n",
        (order % 9) + 1
    )
}

/// Local HTTP endpoint counting POSTs, standing in for a build hook
pub async fn build_hook_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/hook",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/hook", addr), hits)
}
