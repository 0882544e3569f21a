use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::records::{period_label, print_url, resolve_type, type_json};
use crate::errors::CoreError;
use crate::export::{to_csv_records, CSV_CONTENT_TYPE};
use crate::records::RecordFilter;
use crate::server::app::AppState;
use crate::server::context::CurrentUser;
use crate::server::response::HandlerResult;

#[derive(Debug, Default, Deserialize)]
pub struct PrintQuery {
    pub rtype: Option<String>,
    pub q: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub export: Option<String>,
}

/// Printable listing in ascending id order, or the same rows as CSV with
/// `export=csv`.
pub async fn print_view(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Query(query): Query<PrintQuery>,
) -> HandlerResult {
    let slug = query.rtype.as_deref().unwrap_or_default();
    let rtype = match resolve_type(&state, &context, slug, "Invalid print type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let filter = RecordFilter {
        q: query.q.clone(),
        month: query.month.clone(),
        year: query.year.clone(),
    };
    let records = state.records.list_all(rtype, &filter).await?;

    if query.export.as_deref() == Some("csv") {
        let body = to_csv_records::render(rtype, &records).map_err(CoreError::from)?;
        let filename = to_csv_records::filename(rtype, query.month.as_deref(), query.year.as_deref());
        return Ok((
            [
                (CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
                (CONTENT_DISPOSITION, format!("attachment; filename={}", filename)),
            ],
            body,
        )
            .into_response());
    }

    let rows: Vec<_> = records
        .iter()
        .map(|record| json!({ "cells": record.cells() }))
        .collect();
    let csv_url = print_url(rtype, &filter, true);

    let data = json!({
        "rtype": type_json(rtype),
        "headers": rtype.column_names(),
        "column_span": rtype.columns().len() + 1,
        "rows": rows,
        "period": period_label(&filter),
        "csv_url": csv_url,
    });

    let title = format!("{} Records", rtype.title());
    let page = state.render(Some(&context), "printable", &title, data).await?;
    Ok(page.into_response())
}
