use std::path::Path;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::migrations::Migrator;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// `mode=rwc` lets SQLite create the file on first start.
pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://barangay.db?mode=rwc".to_string(),
    }
}

/// Connects to the database file, creating parent directories as needed, and
/// brings the schema up to date.
pub async fn setup_database(database_path: &str) -> anyhow::Result<DatabaseConnection> {
    if database_path != ":memory:" {
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let db = establish_connection(&get_database_url(Some(database_path))).await?;
    Migrator::up(&db, None).await?;
    info!("Database ready at {}", database_path);
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_urls() {
        assert_eq!(get_database_url(Some(":memory:")), "sqlite::memory:");
        assert_eq!(
            get_database_url(Some("data/brgy.db")),
            "sqlite://data/brgy.db?mode=rwc"
        );
        assert_eq!(get_database_url(None), "sqlite://barangay.db?mode=rwc");
    }
}
