use axum::{
    extract::{Multipart, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use tracing::warn;

use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::context::AdminUser;
use crate::server::response::HandlerResult;
use crate::services::auth_service::FlashMessage;
use crate::services::BackupService;

const RECOVERY_PAGE: &str = "/recovery";

pub async fn recovery_page(State(state): State<AppState>, AdminUser(context): AdminUser) -> HandlerResult {
    let page = state
        .render(Some(&context), "recovery", "Backup & Recovery", json!({}))
        .await?;
    Ok(page.into_response())
}

pub async fn backup_database(State(state): State<AppState>, AdminUser(context): AdminUser) -> HandlerResult {
    match state.backup.backup().await {
        Ok(bytes) => Ok((
            [
                (CONTENT_TYPE, "application/x-sqlite3".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename={}", BackupService::backup_filename()),
                ),
            ],
            bytes,
        )
            .into_response()),
        Err(err) => {
            warn!("Backup failed: {}", err);
            state
                .flash(&context, FlashMessage::danger(format!("Backup failed: {}", err.message())))
                .await;
            Ok(Redirect::to(RECOVERY_PAGE).into_response())
        }
    }
}

/// Replaces every record table and the activity log with the uploaded
/// backup. Accounts and sessions survive.
pub async fn restore_database(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    multipart: Multipart,
) -> HandlerResult {
    let outcome = match read_upload(multipart).await {
        Ok(bytes) => state.backup.restore(&bytes).await,
        Err(err) => Err(err),
    };

    let flash = match outcome {
        Ok(summary) => FlashMessage::success(format!(
            "Database restored successfully ({} rows)",
            summary.total_rows()
        )),
        Err(err) => {
            warn!("Restore failed: {}", err);
            FlashMessage::danger(format!("Restore failed: {}", err.message()))
        }
    };
    state.flash(&context, flash).await;
    Ok(Redirect::to(RECOVERY_PAGE).into_response())
}

pub async fn reset_database(State(state): State<AppState>, AdminUser(context): AdminUser) -> HandlerResult {
    let flash = match state.backup.reset().await {
        Ok(removed) => FlashMessage::success(format!("Database reset ({} rows removed)", removed)),
        Err(err) => {
            warn!("Reset failed: {}", err);
            FlashMessage::danger(format!("Reset failed: {}", err.message()))
        }
    };
    state.flash(&context, flash).await;
    Ok(Redirect::to(RECOVERY_PAGE).into_response())
}

/// Bytes of the first uploaded file in the form.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, CoreError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| CoreError::validation(format!("Invalid upload: {}", err)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| CoreError::validation(format!("Invalid upload: {}", err)))?;
        if bytes.is_empty() {
            return Err(CoreError::validation("No file selected"));
        }
        return Ok(bytes.to_vec());
    }
    Err(CoreError::validation("No file selected"))
}
