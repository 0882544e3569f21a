pub mod app;
pub mod context;
pub mod handlers;
pub mod response;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator, seed_data};
use crate::schema::RecordType;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let db = setup_database(&config.database).await?;
    info!("Database migrations completed");

    if config.seed_default_accounts {
        let created = seed_data::seed_default_accounts(&db).await?;
        if created > 0 {
            info!("Created {} default account(s)", created);
        }
    }

    let port = config.port;
    let app = app::create_app(db, config).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("Routes:");
    info!("  /health                     - Health check");
    info!("  /login, /logout             - Sign in and out");
    info!("  /admin, /staff              - Dashboards");
    for rtype in RecordType::ALL {
        info!("  /{:<26} - {} records", rtype.slug(), rtype.title());
    }
    info!("  /print                      - Printable list and CSV export");
    info!("  /users                      - Accounts (admin)");
    info!("  /activity_log               - Audit trail (admin)");
    info!("  /recovery                   - Backup, restore, reset (admin)");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
