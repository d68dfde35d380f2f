//! Login, session gate and logout through the router

use std::sync::OnceLock;

use auth::{AuthConfig, AuthState, rate_limiter::LoginThrottleConfig, routes::router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use tower::ServiceExt;

const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
const PASSWORD: &str = "Contact-Sheet-35mm";

fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| auth::hash_password(PASSWORD).unwrap())
}

fn config(users: &[&str]) -> AuthConfig {
    AuthConfig {
        allowed_users: users.iter().map(|u| u.to_string()).collect(),
        password_hash: Some(password_hash().to_string()),
        cookie_secret: Some(SECRET.to_string()),
        secure_cookie: false,
        ..AuthConfig::default()
    }
}

fn app(config: AuthConfig) -> Router {
    router(AuthState::new(config).unwrap())
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({"username": username, "password": password});
    Request::builder()
        .method("POST")
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_cookie(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|value| value.to_str().unwrap().to_string())
}

/// `name=value` pair of a Set-Cookie header, as a browser would send it back
fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login_cookie(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(login_request(username, PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    cookie_pair(&set_cookie(&response).unwrap())
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = app(config(&["admin"]));

    let response = app
        .clone()
        .oneshot(login_request("admin", PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let header = set_cookie(&response).unwrap();
    assert!(header.starts_with("admin_session="));
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Path=/"));
    assert!(header.contains("Max-Age=604800"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "admin");

    let response = app
        .oneshot(with_cookie(
            "GET",
            "/api/admin/session",
            Some(&cookie_pair(&header)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = app(config(&["admin"]));

    let response = app
        .oneshot(login_request("admin", "not-the-password"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());

    let body = json_body(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_user_outside_allow_list_cannot_log_in() {
    let app = app(config(&["admin"]));

    let response = app
        .oneshot(login_request("visitor", PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_rejects_missing_and_tampered_cookies() {
    let app = app(config(&["admin"]));

    for uri in ["/api/admin/session", "/api/admin/logout"] {
        let method = if uri.ends_with("logout") { "POST" } else { "GET" };
        let response = app
            .clone()
            .oneshot(with_cookie(method, uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let tampered = format!("{}x", login_cookie(&app, "admin").await);
    let response = app
        .oneshot(with_cookie("GET", "/api/admin/session", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_from_another_secret_is_rejected() {
    let issuer = app(config(&["admin"]));
    let cookie = login_cookie(&issuer, "admin").await;

    let other = app(AuthConfig {
        cookie_secret: Some("f".repeat(64)),
        ..config(&["admin"])
    });
    let response = other
        .oneshot(with_cookie("GET", "/api/admin/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_of_removed_user_is_rejected() {
    let before = app(config(&["admin", "editor"]));
    let cookie = login_cookie(&before, "editor").await;

    let after = app(config(&["admin"]));
    let response = after
        .oneshot(with_cookie("GET", "/api/admin/session", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_removes_cookie() {
    let app = app(config(&["admin"]));
    let cookie = login_cookie(&app, "admin").await;

    let response = app
        .oneshot(with_cookie("POST", "/api/admin/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let header = set_cookie(&response).unwrap();
    assert!(header.starts_with("admin_session="));
    assert!(header.contains("Max-Age=0"));
    assert_eq!(json_body(response).await["success"], true);
}

#[tokio::test]
async fn test_repeated_failures_lock_the_user_out() {
    let app = app(AuthConfig {
        login_throttle: LoginThrottleConfig {
            max_failures: 2,
            window_seconds: 300,
            lockout_seconds: 300,
        },
        ..config(&["admin"])
    });

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(login_request("admin", "guess"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .oneshot(login_request("admin", PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("Too many"));
}
