//! Authentication and authorisation error types.

use thiserror::Error;

use super::{CoreError, CoreErrorKind};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Username already exists")]
    UsernameExists,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Admin access required")]
    AdminRequired,

    #[error("You cannot remove your own account")]
    CannotDeleteSelf,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl AuthError {
    /// Check if this is an authentication error (401)
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionExpired | AuthError::SessionNotFound
        )
    }

    /// Check if this is a validation error (400)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidUsername(_)
                | AuthError::InvalidRole(_)
                | AuthError::WeakPassword(_)
                | AuthError::CannotDeleteSelf
        )
    }

    fn kind(&self) -> CoreErrorKind {
        match self {
            err if err.is_authentication_error() => CoreErrorKind::Unauthorized,
            err if err.is_validation_error() => CoreErrorKind::Validation,
            AuthError::UsernameExists => CoreErrorKind::Conflict,
            AuthError::AdminRequired => CoreErrorKind::Forbidden,
            _ => CoreErrorKind::Internal,
        }
    }
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        CoreError::new(kind, message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_core_kinds() {
        let core: CoreError = AuthError::InvalidCredentials.into();
        assert_eq!(core.kind(), CoreErrorKind::Unauthorized);

        let core: CoreError = AuthError::UsernameExists.into();
        assert_eq!(core.kind(), CoreErrorKind::Conflict);

        let core: CoreError = AuthError::WeakPassword("too short".into()).into();
        assert_eq!(core.kind(), CoreErrorKind::Validation);
        assert_eq!(core.message(), "Password does not meet requirements: too short");

        let core: CoreError = AuthError::AdminRequired.into();
        assert_eq!(core.kind(), CoreErrorKind::Forbidden);
    }
}
