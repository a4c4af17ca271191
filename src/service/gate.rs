//! Authorization gate: stateless checks of a `Session` before any catalog work.

use crate::error::ShelfError;
use crate::types::{Role, Session};

pub const LOGIN_REQUIRED: &str = "You must be logged in to view the book list";

/// True iff the session carries a user id.
pub fn require_authenticated(session: &Session) -> bool {
    session.is_authenticated()
}

/// True iff the session carries exactly `role`.
pub fn require_role(session: &Session, role: Role) -> bool {
    session.has_role(role)
}

pub fn ensure_authenticated(session: &Session, message: &str) -> Result<(), ShelfError> {
    if require_authenticated(session) {
        Ok(())
    } else {
        Err(ShelfError::LoginRequired(message.to_string()))
    }
}

/// `action` completes "You must be an administrator to ...".
pub fn ensure_admin(session: &Session, action: &str) -> Result<(), ShelfError> {
    if require_role(session, Role::Admin) {
        Ok(())
    } else {
        Err(ShelfError::Authorization(format!(
            "You must be an administrator to {action}"
        )))
    }
}
