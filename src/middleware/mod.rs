pub mod auth;
pub mod session;

pub use auth::CurrentSession;
pub use session::CookieSettings;
