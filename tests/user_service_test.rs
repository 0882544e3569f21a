//! Account management and login sessions

mod common;

use anyhow::Result;
use barangay::auth::{RequestContext, Role};
use barangay::database::seed_data::seed_default_accounts;
use barangay::errors::{AuthError, CoreErrorKind};
use barangay::services::auth_service::FlashMessage;
use barangay::services::{AuditService, AuthService, UserService};
use common::setup_test_db;

#[tokio::test]
async fn test_seeding_is_idempotent() -> Result<()> {
    let test_db = setup_test_db().await?;

    assert_eq!(seed_default_accounts(&test_db.db).await?, 2);
    assert_eq!(seed_default_accounts(&test_db.db).await?, 0);

    let users = UserService::new(test_db.db.clone()).list().await?;
    let roles: Vec<_> = users.iter().map(|user| (user.username.as_str(), user.role())).collect();
    assert_eq!(roles, vec![("captain", Role::Admin), ("secretary", Role::Staff)]);

    Ok(())
}

#[tokio::test]
async fn test_login_session_and_flash() -> Result<()> {
    let test_db = setup_test_db().await?;
    seed_default_accounts(&test_db.db).await?;
    let auth = AuthService::new(test_db.db.clone(), chrono::Duration::hours(1));

    let err = auth.login("captain", "wrong-password").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let (user, session) = auth.login("captain", "captain123").await?;
    let context = auth.resolve(&session.session_id).await?;
    assert_eq!(context.user_id, Some(user.id));
    assert_eq!(context.role, Role::Admin);

    auth.push_flash(&session.session_id, FlashMessage::success("Saved")).await?;
    assert_eq!(auth.take_flash(&session.session_id).await?.len(), 1);
    assert!(auth.take_flash(&session.session_id).await?.is_empty());

    auth.logout(&session.session_id).await?;
    assert!(matches!(
        auth.resolve(&session.session_id).await,
        Err(AuthError::SessionNotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn test_account_lifecycle_is_audited() -> Result<()> {
    let test_db = setup_test_db().await?;
    let users = UserService::new(test_db.db.clone());
    let audit = AuditService::new(test_db.db.clone());
    let system = RequestContext::system();

    let admin = users.create(&system, "captain", "captain123", Role::Admin).await?;
    let staff = users.create(&system, "secretary", "secretary123", Role::Staff).await?;

    let duplicate = users
        .create(&system, "secretary", "another-pass", Role::Staff)
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), CoreErrorKind::Conflict);

    let admin_context = RequestContext::user("s-1", admin.id, "captain", Role::Admin);
    let renamed = users
        .update(&admin_context, staff.id, "kalihim", Role::Staff)
        .await?;
    assert_eq!(renamed.username, "kalihim");

    users.reset_password(&admin_context, staff.id, "new-secret-1").await?;

    let self_delete = users.delete(&admin_context, admin.id).await.unwrap_err();
    assert_eq!(self_delete.kind(), CoreErrorKind::Validation);

    users.delete(&admin_context, staff.id).await?;
    assert_eq!(users.list().await?.len(), 1);

    let entries = audit.all().await?;
    let actions: Vec<_> = entries.iter().map(|entry| entry.action.as_str()).collect();
    assert_eq!(actions.len(), 5);
    assert!(actions.contains(&"reset_password"));
    assert!(entries.iter().all(|entry| entry.table_name == "user"));
    assert!(entries
        .iter()
        .any(|entry| entry.record_id.as_deref() == Some(format!("{} - kalihim", staff.id).as_str())));

    Ok(())
}

#[tokio::test]
async fn test_staff_cannot_manage_accounts() -> Result<()> {
    let test_db = setup_test_db().await?;
    let users = UserService::new(test_db.db.clone());
    let staff = RequestContext::user("s-2", 7, "secretary", Role::Staff);

    let err = users
        .create(&staff, "intruder", "intruder123", Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CoreErrorKind::Forbidden);

    Ok(())
}
