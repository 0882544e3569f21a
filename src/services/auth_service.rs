use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Duration;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{RequestContext, Role};
use crate::database::entities::{user_sessions, users};
use crate::errors::{AuthError, AuthResult};

/// Name of the HttpOnly cookie carrying the session id.
pub const SESSION_COOKIE: &str = "brgy_session";
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> AuthResult<String> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword("Password cannot be empty".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(hash(password, DEFAULT_COST)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> AuthResult<bool> {
    Ok(verify(password, password_hash)?)
}

pub fn validate_username(username: &str) -> AuthResult<()> {
    if username.len() < 3 {
        return Err(AuthError::InvalidUsername(
            "Username must be at least 3 characters long".to_string(),
        ));
    }
    if username.len() > 50 {
        return Err(AuthError::InvalidUsername(
            "Username is too long (max 50 characters)".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, dots, underscores, and hyphens".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Warning,
    Danger,
}

/// One-shot message shown on the next rendered page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
}

impl FlashMessage {
    pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashCategory::Success, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashCategory::Danger, message)
    }
}

/// Login, logout, and database-backed sessions.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, session_ttl: Duration) -> Self {
        Self { db, session_ttl }
    }

    /// Checks the credentials and opens a session for the user.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<(users::Model, user_sessions::Model)> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;

        let Some(user) = user else {
            warn!("Login attempt for unknown user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password)? {
            warn!("Failed login for '{}'", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        let session = user_sessions::ActiveModel::new(&user, self.session_ttl)
            .insert(&self.db)
            .await?;
        info!("User '{}' logged in", user.username);

        Ok((user, session))
    }

    pub async fn logout(&self, session_id: &str) -> AuthResult<()> {
        let result = user_sessions::Entity::delete_many()
            .filter(user_sessions::Column::SessionId.eq(session_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AuthError::SessionNotFound);
        }
        Ok(())
    }

    /// Turns a session cookie value into the request context. Expired
    /// sessions are removed on sight.
    pub async fn resolve(&self, session_id: &str) -> AuthResult<RequestContext> {
        let session = self.find_session(session_id).await?;

        if session.is_expired() {
            user_sessions::Entity::delete_by_id(session.id)
                .exec(&self.db)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let role: Role = session.role.parse()?;
        Ok(RequestContext::user(
            session.session_id,
            session.user_id,
            session.username,
            role,
        ))
    }

    pub async fn push_flash(&self, session_id: &str, flash: FlashMessage) -> AuthResult<()> {
        let session = self.find_session(session_id).await?;
        let mut pending = decode_flash(session.flash.as_deref());
        pending.push(flash);

        let mut active: user_sessions::ActiveModel = session.into();
        active.flash = Set(Some(encode_flash(&pending)));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Returns and clears the pending messages.
    pub async fn take_flash(&self, session_id: &str) -> AuthResult<Vec<FlashMessage>> {
        let session = self.find_session(session_id).await?;
        let pending = decode_flash(session.flash.as_deref());
        if pending.is_empty() {
            return Ok(pending);
        }

        let mut active: user_sessions::ActiveModel = session.into();
        active.flash = Set(None);
        active.update(&self.db).await?;
        Ok(pending)
    }

    /// Removes every session belonging to the user except `keep`.
    pub async fn revoke_user_sessions(&self, user_id: i32, keep: Option<&str>) -> AuthResult<u64> {
        let mut condition = Condition::all().add(user_sessions::Column::UserId.eq(user_id));
        if let Some(keep) = keep {
            condition = condition.add(user_sessions::Column::SessionId.ne(keep));
        }

        let result = user_sessions::Entity::delete_many()
            .filter(condition)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn find_session(&self, session_id: &str) -> AuthResult<user_sessions::Model> {
        user_sessions::Entity::find()
            .filter(user_sessions::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }
}

fn decode_flash(raw: Option<&str>) -> Vec<FlashMessage> {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn encode_flash(messages: &[FlashMessage]) -> String {
    serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string())
}
