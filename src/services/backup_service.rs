use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sea_orm::sea_query::{Alias, Query, SimpleExpr};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, QueryResult, Statement,
    TransactionTrait, Value,
};
use tracing::{info, warn};

use crate::errors::{CoreError, CoreResult};
use crate::schema::RecordType;

const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";
const ACTIVITY_LOG_COLUMNS: [&str; 6] = ["id", "user", "action", "table_name", "record_id", "timestamp"];

/// A table whose rows are replaced on restore and cleared on reset. Accounts
/// and sessions are never managed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagedTable {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
}

pub fn managed_tables() -> Vec<ManagedTable> {
    let mut tables: Vec<ManagedTable> = RecordType::ALL
        .iter()
        .map(|rtype| ManagedTable {
            name: rtype.table_name(),
            columns: rtype.column_names(),
        })
        .collect();
    tables.push(ManagedTable {
        name: "activity_log",
        columns: ACTIVITY_LOG_COLUMNS.to_vec(),
    });
    tables
}

/// Rows copied per table by a restore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub tables: Vec<(String, usize)>,
}

impl RestoreSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, rows)| rows).sum()
    }
}

/// Removes the scratch file however the operation ends.
struct ScratchFile(PathBuf);

impl ScratchFile {
    fn new(label: &str) -> Self {
        Self(std::env::temp_dir().join(format!("barangay-{}-{}.db", label, uuid::Uuid::new_v4())))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(err) = std::fs::remove_file(&self.0) {
                warn!("Could not remove scratch file {}: {}", self.0.display(), err);
            }
        }
    }
}

#[derive(Clone)]
pub struct BackupService {
    db: DatabaseConnection,
}

impl BackupService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Download name such as `brgy_backup_20250101_083000.db`.
    pub fn backup_filename() -> String {
        format!("brgy_backup_{}.db", Utc::now().format("%Y%m%d_%H%M%S"))
    }

    /// Consistent snapshot of the whole database file.
    pub async fn backup(&self) -> CoreResult<Vec<u8>> {
        let scratch = ScratchFile::new("backup");
        let target = scratch.path().to_string_lossy().replace('\'', "''");

        self.db
            .execute(Statement::from_string(
                DbBackend::Sqlite,
                format!("VACUUM INTO '{}'", target),
            ))
            .await?;

        let bytes = tokio::fs::read(scratch.path()).await?;
        info!("Database backup taken ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Replaces every managed table with the rows of the uploaded database.
    /// Accounts and sessions are left untouched.
    pub async fn restore(&self, bytes: &[u8]) -> CoreResult<RestoreSummary> {
        if !bytes.starts_with(SQLITE_MAGIC) {
            return Err(CoreError::validation("Uploaded file is not a SQLite database"));
        }

        let scratch = ScratchFile::new("restore");
        tokio::fs::write(scratch.path(), bytes).await?;

        let source = Database::connect(format!("sqlite://{}?mode=ro", scratch.path().display()))
            .await
            .map_err(|err| CoreError::validation(format!("Could not open backup: {}", err)))?;

        let copied = read_backup(&source).await;
        if let Err(err) = source.close().await {
            warn!("Closing backup connection failed: {}", err);
        }
        let copied = copied?;

        let txn = self.db.begin().await?;
        let mut summary = RestoreSummary::default();

        for (table, columns, rows) in copied {
            txn.execute(build(&Query::delete().from_table(Alias::new(table.name)).to_owned()))
                .await?;

            let row_count = rows.len();
            for row in rows {
                let insert = Query::insert()
                    .into_table(Alias::new(table.name))
                    .columns(columns.iter().map(|column| Alias::new(*column)))
                    .values(row.into_iter().map(SimpleExpr::Value))
                    .map_err(|err| CoreError::internal(format!("Failed to build insert: {}", err)))?
                    .to_owned();
                txn.execute(build(&insert)).await?;
            }

            summary.tables.push((table.name.to_string(), row_count));
        }

        txn.commit().await?;
        info!("Database restored ({} rows)", summary.total_rows());
        Ok(summary)
    }

    /// Deletes every row of the managed tables. Returns the number removed.
    pub async fn reset(&self) -> CoreResult<u64> {
        let txn = self.db.begin().await?;
        let mut removed = 0;

        for table in managed_tables() {
            let result = txn
                .execute(build(&Query::delete().from_table(Alias::new(table.name)).to_owned()))
                .await?;
            removed += result.rows_affected();
        }

        txn.commit().await?;
        info!("Database reset ({} rows removed)", removed);
        Ok(removed)
    }
}

type TableRows = (ManagedTable, Vec<&'static str>, Vec<Vec<Value>>);

async fn read_backup(source: &DatabaseConnection) -> CoreResult<Vec<TableRows>> {
    let present = table_names(source).await?;
    let tables = managed_tables();

    if let Some(missing) = tables.iter().find(|table| !present.contains(table.name)) {
        return Err(CoreError::validation(format!(
            "Backup is missing the '{}' table",
            missing.name
        )));
    }

    let mut copied = Vec::with_capacity(tables.len());
    for table in tables {
        let available = column_names(source, table.name).await?;
        let columns: Vec<&'static str> = table
            .columns
            .iter()
            .copied()
            .filter(|column| available.contains(*column))
            .collect();

        let select = Query::select()
            .columns(columns.iter().map(|column| Alias::new(*column)))
            .from(Alias::new(table.name))
            .to_owned();
        let rows = source.query_all(build(&select)).await?;

        let values: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| columns.iter().map(|column| raw_value(row, column)).collect())
            .collect();
        copied.push((table, columns, values));
    }
    Ok(copied)
}

async fn table_names(conn: &DatabaseConnection) -> CoreResult<HashSet<String>> {
    let rows = conn
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table'",
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(CoreError::from))
        .collect()
}

async fn column_names(conn: &DatabaseConnection, table: &str) -> CoreResult<HashSet<String>> {
    let rows = conn
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            format!("PRAGMA table_info(\"{}\")", table),
        ))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name").map_err(CoreError::from))
        .collect()
}

/// Reads a cell without knowing its type: integer, then real, then text,
/// then blob.
fn raw_value(row: &QueryResult, column: &str) -> Value {
    if let Ok(value) = row.try_get::<Option<i64>>("", column) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<f64>>("", column) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<String>>("", column) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>>("", column) {
        return value.into();
    }
    Value::String(None)
}

fn build<S: sea_orm::StatementBuilder>(statement: &S) -> Statement {
    DbBackend::Sqlite.build(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_never_managed() {
        let names: Vec<_> = managed_tables().iter().map(|table| table.name).collect();
        assert!(names.contains(&"indigency"));
        assert!(names.contains(&"activity_log"));
        assert!(!names.contains(&"user"));
        assert!(!names.contains(&"user_sessions"));
    }

    #[test]
    fn backup_filename_shape() {
        let name = BackupService::backup_filename();
        assert!(name.starts_with("brgy_backup_"));
        assert!(name.ends_with(".db"));
    }

    #[tokio::test]
    async fn rejects_non_sqlite_uploads() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let err = BackupService::new(db)
            .restore(b"name,address\nAna,Purok 1\n")
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Uploaded file is not a SQLite database");
    }
}
