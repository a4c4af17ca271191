#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use bookshelf::config::Config;
use bookshelf::db::CatalogStorage;
use bookshelf::router::{ShelfState, shelf_router};
use bookshelf::service::{AuthService, CatalogService};
use bookshelf::types::{LoginForm, RegistrationForm, Session};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

/// A SQLite file under the temp dir, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
    pub storage: CatalogStorage,
}

impl TempDb {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "bookshelf-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        let database_url = format!("sqlite:{}", path.display());
        let storage = bookshelf::db::spawn(&database_url)
            .await
            .expect("failed to open test database");
        Self { path, storage }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut side = self.path.clone().into_os_string();
            side.push(suffix);
            let _ = std::fs::remove_file(side);
        }
    }
}

pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.basic.insecure_cookie = true;
    cfg.basic.session_secret = Some("k".repeat(64));
    cfg.auth.bcrypt_cost = 4;
    cfg
}

pub async fn auth_service(db: &TempDb) -> AuthService {
    AuthService::new(db.storage.clone(), &test_config().auth)
        .await
        .expect("auth service")
}

pub fn catalog_service(db: &TempDb) -> CatalogService {
    CatalogService::new(db.storage.clone())
}

pub fn registration(username: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        password: password.to_string(),
        password2: password.to_string(),
    }
}

pub fn credentials(username: &str, password: &str) -> LoginForm {
    LoginForm {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Register then log in, returning the resulting session.
pub async fn signed_in(auth: &AuthService, username: &str) -> Session {
    auth.register(&registration(username, "correct horse"))
        .await
        .expect("register");
    auth.login(&credentials(username, "correct horse"))
        .await
        .expect("login")
}

pub async fn spawn_app(tag: &str) -> (TempDb, Router) {
    let db = TempDb::new(tag).await;
    let state = ShelfState::from_config(db.storage.clone(), &test_config())
        .await
        .expect("state");
    (db, shelf_router(state))
}

/// Drives the router like a browser: keeps cookies between requests.
pub struct TestClient {
    app: Router,
    cookies: BTreeMap<String, String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).expect("request");
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> TestResponse {
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(req).await
    }

    /// Register (if needed) and log in with a fixed password.
    pub async fn sign_in(&mut self, username: &str) {
        self.post_form(
            "/auth/register",
            &format!("username={username}&password=pw&password2=pw"),
        )
        .await;
        let resp = self
            .post_form("/auth/login", &format!("username={username}&password=pw"))
            .await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        assert_eq!(resp.location.as_deref(), Some("/"));
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        self.absorb_cookies(&resp);
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        TestResponse {
            status,
            location,
            body: String::from_utf8(body.to_vec()).expect("response body was not utf-8"),
        }
    }

    fn absorb_cookies(&mut self, resp: &Response<Body>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let removed = value.is_empty() || raw.to_ascii_lowercase().contains("max-age=0");
            if removed {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
}
