pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;
pub mod views;

pub use error::ShelfError;
pub use service::{AuthService, CatalogService};
pub use types::{Role, Session};
