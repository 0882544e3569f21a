//! Backup, restore, and reset against real SQLite files

mod common;

use anyhow::Result;
use barangay::auth::{RequestContext, Role};
use barangay::records::{CoercionPolicy, RecordFilter};
use barangay::schema::RecordType;
use barangay::services::{AuditService, BackupService, RecordService, UserService};
use common::{form, setup_test_db};

fn names(records: &[barangay::records::Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.text("name").map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_backup_is_a_sqlite_file() -> Result<()> {
    let test_db = setup_test_db().await?;
    let bytes = BackupService::new(test_db.db.clone()).backup().await?;

    assert!(bytes.starts_with(b"SQLite format 3\0"));
    Ok(())
}

#[tokio::test]
async fn test_restore_replaces_records_and_keeps_users() -> Result<()> {
    let test_db = setup_test_db().await?;
    let actor = RequestContext::system();
    let records = RecordService::new(test_db.db.clone(), CoercionPolicy::Lenient);
    let users = UserService::new(test_db.db.clone());
    let audit = AuditService::new(test_db.db.clone());
    let backup = BackupService::new(test_db.db.clone());

    users.create(&actor, "captain", "captain123", Role::Admin).await?;
    records
        .create(&actor, RecordType::Clearance, &form(&[("name", "Ana"), ("date_issued", "2025-01-10")]))
        .await?;
    records
        .create(&actor, RecordType::Clearance, &form(&[("name", "Ben")]))
        .await?;
    let audit_at_backup = audit.all().await?.len();

    let snapshot = backup.backup().await?;

    // Changes made after the backup
    records
        .create(&actor, RecordType::Clearance, &form(&[("name", "Carlo")]))
        .await?;
    records
        .create(&actor, RecordType::Indigency, &form(&[("name", "Dina")]))
        .await?;
    users.create(&actor, "kagawad", "kagawad123", Role::Staff).await?;
    let users_before_restore = users.list().await?;

    let summary = backup.restore(&snapshot).await?;
    assert!(summary.tables.iter().any(|(table, rows)| table == "clearance" && *rows == 2));

    let clearance = records.list_all(RecordType::Clearance, &RecordFilter::default()).await?;
    assert_eq!(names(&clearance), vec!["Ana", "Ben"]);
    assert_eq!(clearance[0].display_value("date_issued"), "2025-01-10");
    assert_eq!(records.count(RecordType::Indigency).await?, 0);
    assert_eq!(audit.all().await?.len(), audit_at_backup);

    // Accounts are never touched by a restore
    assert_eq!(users.list().await?, users_before_restore);

    Ok(())
}

#[tokio::test]
async fn test_restore_rejects_incomplete_database() -> Result<()> {
    let source = setup_test_db().await?;
    let target = setup_test_db().await?;

    let bytes = BackupService::new(source.db.clone()).backup().await?;
    // A valid SQLite file, but without the expected schema
    let foreign = tempfile::NamedTempFile::new()?;
    let foreign_db = sea_orm::Database::connect(format!(
        "sqlite://{}?mode=rwc",
        foreign.path().display()
    ))
    .await?;
    sea_orm::ConnectionTrait::execute_unprepared(&foreign_db, "CREATE TABLE notes (id INTEGER PRIMARY KEY)")
        .await?;
    let foreign_bytes = BackupService::new(foreign_db).backup().await?;

    let service = BackupService::new(target.db.clone());
    let err = service.restore(&foreign_bytes).await.unwrap_err();
    assert!(err.message().contains("missing"), "{}", err.message());

    // The complete one still restores
    service.restore(&bytes).await?;
    Ok(())
}

#[tokio::test]
async fn test_reset_clears_everything_but_accounts() -> Result<()> {
    let test_db = setup_test_db().await?;
    let actor = RequestContext::system();
    let records = RecordService::new(test_db.db.clone(), CoercionPolicy::Lenient);
    let users = UserService::new(test_db.db.clone());

    users.create(&actor, "secretary", "secretary123", Role::Staff).await?;
    for rtype in RecordType::ALL {
        records.create(&actor, rtype, &form(&[("name", "Someone")])).await?;
    }

    let removed = BackupService::new(test_db.db.clone()).reset().await?;
    // Five records plus six audit entries
    assert_eq!(removed, 11);

    for (_, count) in records.counts().await? {
        assert_eq!(count, 0);
    }
    assert!(AuditService::new(test_db.db.clone()).all().await?.is_empty());
    assert_eq!(users.list().await?.len(), 1);

    Ok(())
}
