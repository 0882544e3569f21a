use axum::{extract::State, http::StatusCode, response::Json};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::{json, Value};
use tracing::warn;

use crate::server::app::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = state
        .db
        .execute(Statement::from_string(DbBackend::Sqlite, "SELECT 1"))
        .await;

    let (status, database) = match database {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!("Health check database probe failed: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "healthy" } else { "degraded" },
            "service": "barangay-records",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}
