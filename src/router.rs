use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{BasicConfig, Config};
use crate::db::CatalogStorage;
use crate::error::ShelfError;
use crate::handlers::{auth, catalog};
use crate::middleware::CookieSettings;
use crate::service::{AuthService, CatalogService};

#[derive(Clone)]
pub struct ShelfState {
    pub catalog: CatalogService,
    pub auth: AuthService,
    pub cookies: CookieSettings,
    key: Key,
}

impl ShelfState {
    pub fn new(
        catalog: CatalogService,
        auth: AuthService,
        cookies: CookieSettings,
        key: Key,
    ) -> Self {
        Self {
            catalog,
            auth,
            cookies,
            key,
        }
    }

    /// Wire services and cookie settings from configuration over an opened store.
    pub async fn from_config(storage: CatalogStorage, cfg: &Config) -> Result<Self, ShelfError> {
        cfg.validate()?;
        let auth = AuthService::new(storage.clone(), &cfg.auth).await?;
        let catalog = CatalogService::new(storage);
        let cookies = CookieSettings {
            secure: !cfg.basic.insecure_cookie,
            session_ttl: Duration::minutes(cfg.basic.session_ttl_minutes),
        };
        Ok(Self::new(catalog, auth, cookies, session_key(&cfg.basic)))
    }
}

impl FromRef<ShelfState> for Key {
    fn from_ref(state: &ShelfState) -> Self {
        state.key.clone()
    }
}

/// Key for the private session cookie. `Config::validate` has already checked the
/// secret length. Without a configured secret every restart invalidates sessions.
fn session_key(cfg: &BasicConfig) -> Key {
    match cfg.session_secret.as_deref() {
        Some(secret) => Key::from(secret.as_bytes()),
        None => {
            warn!("basic.session_secret not set; generating an ephemeral session key");
            Key::generate()
        }
    }
}

pub fn shelf_router(state: ShelfState) -> Router {
    let auth_routes = Router::new()
        .route(
            "/register",
            get(auth::register_page).post(auth::register_submit),
        )
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout));

    Router::new()
        .route("/", get(catalog::index))
        .route("/add", get(catalog::add_book_page).post(catalog::add_book_submit))
        .route(
            "/update/{id}",
            get(catalog::update_book_page).post(catalog::update_book_submit),
        )
        .route("/delete/{id}", post(catalog::delete_book))
        .route(
            "/search",
            get(catalog::search_page).post(catalog::search_submit),
        )
        .route(
            "/add_genre",
            get(catalog::add_genre_page).post(catalog::add_genre_submit),
        )
        .route("/genres", get(catalog::list_genres))
        .route(
            "/update_genre/{id}",
            get(catalog::update_genre_page).post(catalog::update_genre_submit),
        )
        .route("/delete_genre/{id}", post(catalog::delete_genre))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
