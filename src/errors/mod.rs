//! Error types shared by the services and the HTTP layer.
//!
//! - **CoreError**: kind + user-facing message + optional field map. Every
//!   service returns [`CoreResult`].
//! - **AuthError**: authentication and account management failures; converts
//!   into `CoreError`.
//!
//! # Examples
//!
//! ```rust
//! use barangay::errors::{CoreError, CoreErrorKind};
//!
//! let err = CoreError::invalid_field("name", "Name is required");
//! assert_eq!(err.kind(), CoreErrorKind::Validation);
//! assert_eq!(err.field(), Some("name"));
//! ```

pub mod auth;
pub mod core_error;

pub use auth::AuthError;
pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_result_alias() {
        let result: CoreResult<i32> = Err(CoreError::not_found("indigency", "1"));
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_result_alias() {
        let result: AuthResult<()> = Err(AuthError::InvalidCredentials);
        assert!(result.is_err());
    }
}
