use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use barangay::auth::{RequestContext, Role};
use barangay::config::{AppConfig, ConfigOverrides};
use barangay::database::{seed_data, setup_database};
use barangay::server;
use barangay::services::UserService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web application
    Serve {
        #[clap(short, long)]
        config: Option<PathBuf>,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "barangay.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = "barangay.db")]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create an account without going through the web interface
    Add {
        #[clap(short, long)]
        username: String,
        #[clap(short, long)]
        password: String,
        #[clap(short, long, default_value = "staff")]
        role: String,
        #[clap(short, long, default_value = "barangay.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            config,
            port,
            database,
            cors_origin,
        } => {
            let config = AppConfig::load(config.as_deref())?.with_overrides(ConfigOverrides {
                port,
                database,
                cors_origin,
            });
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                let db = setup_database(&database).await?;
                let created = seed_data::seed_default_accounts(&db).await?;
                info!("Database ready, {} default account(s) created", created);
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Migrating database: {}", database);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                password,
                role,
                database,
            } => {
                let role: Role = role.parse()?;
                let db = setup_database(&database).await?;
                let user = UserService::new(db)
                    .create(&RequestContext::system(), &username, &password, role)
                    .await?;
                info!("Created {} account '{}' (id {})", role, user.username, user.id);
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "barangay={},tower_http={},sea_orm=warn,sqlx=warn",
            log_level, log_level
        ))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
