use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::info;

use crate::auth::{RequestContext, Role};
use crate::database::entities::{user_sessions, users};
use crate::errors::{AuthError, CoreError, CoreResult};
use crate::records::resolve_display_name;
use crate::services::audit_service::{record_entry, AuditAction};
use crate::services::auth_service::{hash_password, validate_username};

const USER_TABLE: &str = "user";

/// Account management. Every mutation is audited in its own transaction.
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> CoreResult<users::Model> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id.to_string()))
    }

    pub async fn create(
        &self,
        actor: &RequestContext,
        username: &str,
        password: &str,
        role: Role,
    ) -> CoreResult<users::Model> {
        actor.require_admin()?;
        let username = username.trim();
        validate_username(username)?;
        let password_hash = hash_password(password)?;

        let txn = self.db.begin().await?;
        if username_taken(&txn, username, None).await? {
            return Err(AuthError::UsernameExists.into());
        }

        let user = users::ActiveModel::new(username.to_string(), password_hash, role)
            .insert(&txn)
            .await?;
        record_entry(&txn, actor, AuditAction::Create, USER_TABLE, Some(user_label(&user))).await?;
        txn.commit().await?;

        info!("{} created {} account '{}'", actor.username, role, user.username);
        Ok(user)
    }

    /// Renames an account and/or changes its role.
    pub async fn update(
        &self,
        actor: &RequestContext,
        id: i32,
        username: &str,
        role: Role,
    ) -> CoreResult<users::Model> {
        actor.require_admin()?;
        let username = username.trim();
        validate_username(username)?;

        if actor.user_id == Some(id) && role != Role::Admin {
            return Err(CoreError::validation("You cannot remove your own admin role"));
        }

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id.to_string()))?;

        if username_taken(&txn, username, Some(id)).await? {
            return Err(AuthError::UsernameExists.into());
        }

        let mut active: users::ActiveModel = existing.into();
        active.username = Set(username.to_string());
        active.role = Set(role.as_str().to_string());
        let user = active.update(&txn).await?;

        // Sessions cache the username and role.
        user_sessions::Entity::update_many()
            .col_expr(user_sessions::Column::Username, Expr::value(user.username.clone()))
            .col_expr(user_sessions::Column::Role, Expr::value(user.role.clone()))
            .filter(user_sessions::Column::UserId.eq(user.id))
            .exec(&txn)
            .await?;

        record_entry(&txn, actor, AuditAction::Update, USER_TABLE, Some(user_label(&user))).await?;
        txn.commit().await?;

        info!("{} updated account {}", actor.username, user.id);
        Ok(user)
    }

    pub async fn delete(&self, actor: &RequestContext, id: i32) -> CoreResult<users::Model> {
        actor.require_admin()?;
        if actor.user_id == Some(id) {
            return Err(AuthError::CannotDeleteSelf.into());
        }

        let txn = self.db.begin().await?;
        let user = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id.to_string()))?;

        user_sessions::Entity::delete_many()
            .filter(user_sessions::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        users::Entity::delete_by_id(id).exec(&txn).await?;

        record_entry(&txn, actor, AuditAction::Delete, USER_TABLE, Some(user_label(&user))).await?;
        txn.commit().await?;

        info!("{} deleted account '{}'", actor.username, user.username);
        Ok(user)
    }

    /// Sets a new password and signs the account out everywhere except the
    /// actor's own session.
    pub async fn reset_password(
        &self,
        actor: &RequestContext,
        id: i32,
        new_password: &str,
    ) -> CoreResult<users::Model> {
        actor.require_admin()?;
        let password_hash = hash_password(new_password)?;

        let txn = self.db.begin().await?;
        let existing = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id.to_string()))?;

        let mut active: users::ActiveModel = existing.into();
        active.password = Set(password_hash);
        let user = active.update(&txn).await?;

        let mut stale = Condition::all().add(user_sessions::Column::UserId.eq(id));
        if let Some(current) = actor.session_id.as_deref() {
            stale = stale.add(user_sessions::Column::SessionId.ne(current));
        }
        user_sessions::Entity::delete_many()
            .filter(stale)
            .exec(&txn)
            .await?;

        record_entry(
            &txn,
            actor,
            AuditAction::ResetPassword,
            USER_TABLE,
            Some(user_label(&user)),
        )
        .await?;
        txn.commit().await?;

        info!("{} reset the password of '{}'", actor.username, user.username);
        Ok(user)
    }
}

/// `"3 - secretary"`
pub fn user_label(user: &users::Model) -> String {
    let name = resolve_display_name(
        |field| (field == "username").then(|| user.username.clone()),
        Some(i64::from(user.id)),
        || "user record".to_string(),
    );
    format!("{} - {}", user.id, name)
}

async fn username_taken<C>(conn: &C, username: &str, except: Option<i32>) -> CoreResult<bool>
where
    C: ConnectionTrait,
{
    let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
    if let Some(id) = except {
        query = query.filter(users::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_the_username() {
        let user = users::Model {
            id: 3,
            username: "secretary".into(),
            password: String::new(),
            role: "staff".into(),
        };
        assert_eq!(user_label(&user), "3 - secretary");
    }
}
