use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use handlebars::Handlebars;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{activity, auth, dashboard, health, print, records, recovery, users};
use crate::common::get_handlebars;
use crate::config::AppConfig;
use crate::services::{AuditService, AuthService, BackupService, RecordService, UserService};

/// Uploaded backups may be far larger than axum's default body limit.
const RESTORE_BODY_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub templates: Arc<Handlebars<'static>>,
    pub auth: AuthService,
    pub records: RecordService,
    pub users: UserService,
    pub audit: AuditService,
    pub backup: BackupService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Result<Self> {
        let templates = get_handlebars().context("failed to load page templates")?;

        Ok(Self {
            auth: AuthService::new(db.clone(), config.session_ttl()),
            records: RecordService::new(db.clone(), config.coercion),
            users: UserService::new(db.clone()),
            audit: AuditService::new(db.clone()),
            backup: BackupService::new(db.clone()),
            templates: Arc::new(templates),
            config: Arc::new(config),
            db,
        })
    }
}

pub async fn create_app(db: DatabaseConnection, config: AppConfig) -> Result<Router> {
    let cors = match config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let state = AppState::new(db, config)?;

    let app = Router::new()
        .route("/health", get(health::health_check))
        // Authentication
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        // Dashboards
        .route("/", get(dashboard::index))
        .route("/admin", get(dashboard::admin_dashboard))
        .route("/staff", get(dashboard::staff_dashboard))
        // Print and export
        .route("/print", get(print::print_view))
        // Accounts
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/edit/:id", post(users::update_user))
        .route("/users/delete/:id", post(users::delete_user))
        .route("/users/reset/:id", post(users::reset_password))
        // Audit trail
        .route("/activity_log", get(activity::activity_log))
        .route("/export-logs-excel", get(activity::export_logs_excel))
        // Recovery
        .route("/recovery", get(recovery::recovery_page))
        .route("/backup_database", get(recovery::backup_database))
        .route(
            "/restore_database",
            post(recovery::restore_database).layer(DefaultBodyLimit::max(RESTORE_BODY_LIMIT)),
        )
        .route("/reset_database", post(recovery::reset_database))
        // Generic record routes, matched after the fixed paths above
        .route("/:rtype", get(records::list_records).post(records::create_record))
        .route(
            "/:rtype/edit/:id",
            get(records::edit_record_page).post(records::update_record),
        )
        .route("/:rtype/delete/:id", post(records::delete_record))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
