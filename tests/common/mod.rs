#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::Result;
use barangay::database::setup_database;
use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;

/// A migrated database in a temp file that lives as long as this value.
pub struct TestDb {
    pub db: DatabaseConnection,
    _file: NamedTempFile,
}

pub async fn setup_test_db() -> Result<TestDb> {
    let file = NamedTempFile::new()?;
    let path = file
        .path()
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("temp path is not UTF-8"))?
        .to_string();

    let db = setup_database(&path).await?;
    Ok(TestDb { db, _file: file })
}

pub fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn days_ago(days: i64) -> String {
    (chrono::Utc::now().date_naive() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
