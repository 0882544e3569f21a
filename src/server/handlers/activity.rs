use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::export::{to_xlsx_activity, XLSX_CONTENT_TYPE};
use crate::records::PageRequest;
use crate::server::app::AppState;
use crate::server::context::AdminUser;
use crate::server::response::{pagination, HandlerResult};

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub page: Option<String>,
}

pub async fn activity_log(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    Query(query): Query<ActivityQuery>,
) -> HandlerResult {
    let request = PageRequest::page(query.page.as_deref().and_then(|page| page.trim().parse().ok()));
    let page = state.audit.list(request).await?;

    let entries: Vec<Value> = page
        .items
        .iter()
        .map(|entry| {
            json!({
                "timestamp": entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                "user": entry.user,
                "action": entry.action,
                "table_name": entry.table_name,
                "record_id": entry.record_id,
            })
        })
        .collect();

    let links = pagination(page.page, page.total_pages, page.total_items, |number| {
        format!("/activity_log?page={}", number)
    });

    let data = json!({ "entries": entries, "page": links });
    let page = state
        .render(Some(&context), "activity_log", "Activity Log", data)
        .await?;
    Ok(page.into_response())
}

pub async fn export_logs_excel(
    State(state): State<AppState>,
    AdminUser(_context): AdminUser,
) -> HandlerResult {
    let bytes = state.audit.export_workbook().await?;

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", to_xlsx_activity::FILENAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
