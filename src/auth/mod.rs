use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, CoreError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Landing page after login.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Staff => "/staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

/// Who is performing the current operation. Built per request from the
/// session cookie and passed explicitly into services.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RequestContext {
    pub session_id: Option<String>,
    pub user_id: Option<i32>,
    pub username: String,
    pub role: Role,
}

impl RequestContext {
    pub fn user(session_id: impl Into<String>, user_id: i32, username: impl Into<String>, role: Role) -> Self {
        Self {
            session_id: Some(session_id.into()),
            user_id: Some(user_id),
            username: username.into(),
            role,
        }
    }

    /// Context for CLI and maintenance tasks run outside a login session.
    pub fn system() -> Self {
        Self {
            session_id: None,
            user_id: None,
            username: "system".to_string(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), CoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired.into())
        }
    }
}
