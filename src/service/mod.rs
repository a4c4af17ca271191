pub mod auth;
pub mod catalog;
pub mod gate;
pub mod validation;

pub use auth::AuthService;
pub use catalog::CatalogService;
