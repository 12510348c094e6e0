//! Shared harness: the real router over a temp SQLite file, plus a tiny
//! cookie jar so sessions carry across requests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use tinyblog::auth::session;
use tinyblog::config::{Config, MIN_BCRYPT_COST};
use tinyblog::db::{self, Store};
use tinyblog::routes;
use tinyblog::state::AppState;

const SECRET: &str = "test-secret-test-secret-test-secret-test-secret-test-secret-0000";

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestClient {
    app: Router,
    pub store: Store,
    pub db_path: PathBuf,
    cookies: HashMap<String, String>,
    _tmp: Arc<TempDir>,
}

fn state_for(store: Store) -> AppState {
    let mut config = Config::default();
    config.auth.bcrypt_cost = MIN_BCRYPT_COST;
    AppState {
        store,
        config,
        cookie_key: session::signing_key(Some(SECRET)),
    }
}

impl TestClient {
    /// A client over a fresh, migrated database.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.db");
        let store = Store::open(&db_path, Duration::from_secs(2));
        db::run_migrations(&store).expect("Failed to run migrations");
        Self::with_store(tmp, db_path, store)
    }

    /// A client whose store can never be opened.
    pub fn unreachable() -> Self {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let db_path = blocker.join("test.db");
        let store = Store::open(&db_path, Duration::from_millis(100));
        Self::with_store(tmp, db_path, store)
    }

    fn with_store(tmp: TempDir, db_path: PathBuf, store: Store) -> Self {
        Self {
            app: routes::app(state_for(store.clone())),
            store,
            db_path,
            cookies: HashMap::new(),
            _tmp: Arc::new(tmp),
        }
    }

    /// Another browser against the same server and database.
    pub fn fresh_browser(&self) -> Self {
        Self {
            app: self.app.clone(),
            store: self.store.clone(),
            db_path: self.db_path.clone(),
            cookies: HashMap::new(),
            _tmp: self._tmp.clone(),
        }
    }

    pub fn set_raw_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Carry a cookie over from another client. Every client signs with the
    /// same key, so a session issued by one server is valid on another.
    pub fn copy_cookie_from(&mut self, other: &TestClient, name: &str) {
        let value = other.cookies.get(name).expect("no such cookie").clone();
        self.cookies.insert(name.to_string(), value);
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = Request::builder().method("GET").uri(uri);
        self.send(req, Body::empty()).await
    }

    /// Form post. Values are sent as-is, so keep them to URL-safe characters.
    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(req, Body::from(body)).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/register",
            &[("username", username), ("password", password)],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/auth/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn logout(&mut self) -> TestResponse {
        self.get("/auth/logout").await
    }

    async fn send(&mut self, mut req: axum::http::request::Builder, body: Body) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            req = req.header(header::COOKIE, cookie);
        }

        let response = self
            .app
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap();
            let (name, val) = pair.split_once('=').unwrap();
            if val.is_empty() || value.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), val.to_string());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub fn user_count(&self, username: &str) -> i64 {
        let conn = self.store.connect().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            [username],
            |row| row.get(0),
        )
        .unwrap()
    }

    pub fn post_count(&self) -> i64 {
        let conn = self.store.connect().unwrap();
        conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .unwrap()
    }

    pub fn post_id_by_title(&self, title: &str) -> i64 {
        let conn = self.store.connect().unwrap();
        conn.query_row("SELECT id FROM posts WHERE title = ?1", [title], |row| {
            row.get(0)
        })
        .unwrap()
    }
}
