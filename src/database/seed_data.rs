use sea_orm::*;
use tracing::info;

use crate::auth::Role;
use crate::database::entities::users;
use crate::errors::CoreResult;
use crate::services::auth_service::hash_password;

/// Accounts created on first start so the office can log in at all.
pub const DEFAULT_ACCOUNTS: [(&str, &str, Role); 2] = [
    ("captain", "captain123", Role::Admin),
    ("secretary", "secretary123", Role::Staff),
];

/// Inserts each default account whose username is not taken yet. Returns the
/// number of accounts created.
pub async fn seed_default_accounts(db: &DatabaseConnection) -> CoreResult<usize> {
    let mut created = 0;

    for (username, password, role) in DEFAULT_ACCOUNTS {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?;

        if existing.is_some() {
            continue;
        }

        let hash = hash_password(password)?;
        users::ActiveModel::new(username.to_string(), hash, role)
            .insert(db)
            .await?;
        info!("Seeded default {} account '{}'", role, username);
        created += 1;
    }

    Ok(created)
}
