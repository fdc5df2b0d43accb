#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use warbler_api::auth::{AppState, AppStateInner, create_token};
use warbler_api::credentials::hash_password;
use warbler_api::middleware::SESSION_COOKIE;
use warbler_db::Database;
use warbler_db::models::{MessageRow, NewUser, UserRow};
use warbler_types::api::{Flash, HomeResponse};

pub const SECRET: &str = "test-secret";

/// Argon2 is slow in debug builds; seeded users share one hash of "password".
fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password("password").unwrap())
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            session_secret: SECRET.to_string(),
        });
        let router = warbler_api::router(state.clone());
        Self { state, router }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub fn seed_user(&self, username: &str) -> UserRow {
        self.db()
            .insert_user(&NewUser {
                username: username.to_string(),
                email: format!("{username}@test.com"),
                password_hash: password_hash().to_string(),
                image_url: None,
            })
            .unwrap()
    }

    pub fn seed_message(&self, user: &UserRow, text: &str) -> MessageRow {
        self.db().insert_message(user.id, text).unwrap()
    }

    /// Cookie header value for a logged-in session.
    pub fn session_for(&self, user: &UserRow) -> String {
        let token = create_token(SECRET, user.id, &user.username).unwrap();
        format!("{SESSION_COOKIE}={token}")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.db()
            .with_conn(|conn| {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
            })
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(request("GET", path, cookie, Body::empty())).await
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(request("POST", path, cookie, Body::empty())).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        cookie: Option<&str>,
        json: serde_json::Value,
    ) -> Response<Body> {
        let mut req = request("POST", path, cookie, Body::from(json.to_string()));
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        self.send(req).await
    }

    /// Follows a redirect to the home page carrying the cookies it set,
    /// returning the flashes shown there.
    pub async fn flashes_after(&self, resp: &Response<Body>) -> Vec<Flash> {
        let cookies = set_cookies(resp);
        let home = self.get("/", Some(&cookies)).await;
        assert_eq!(home.status(), StatusCode::OK);
        body_json::<HomeResponse>(home).await.flashes
    }
}

fn request(method: &str, path: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

/// `Set-Cookie` headers folded into a `Cookie` header value. Removal cookies
/// (empty value) are skipped.
pub fn set_cookies(resp: &Response<Body>) -> String {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_json<T: DeserializeOwned>(resp: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn assert_unauthorized(resp: &Response<Body>) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(resp), "/");
}
