use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::RequestContext;
use crate::errors::CoreErrorKind;
use crate::records::{PageRequest, Record, RecordFilter};
use crate::schema::{introspect::field_descriptors, RecordType};
use crate::server::app::AppState;
use crate::server::context::CurrentUser;
use crate::server::response::{pagination, HandlerResult};
use crate::services::auth_service::FlashMessage;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            q: self.q.clone(),
            month: self.month.clone(),
            year: self.year.clone(),
        }
    }

    /// Unparseable page numbers fall back to the first page.
    fn page(&self) -> PageRequest {
        PageRequest::page(self.page.as_deref().and_then(|page| page.trim().parse().ok()))
    }
}

/// Resolves the path segment, or flashes "Invalid type" and sends the user
/// back to their dashboard.
pub(crate) async fn resolve_type(
    state: &AppState,
    context: &RequestContext,
    slug: &str,
    message: &str,
) -> Result<RecordType, Redirect> {
    match RecordType::from_slug(slug) {
        Some(rtype) => Ok(rtype),
        None => {
            state.flash(context, FlashMessage::danger(message)).await;
            Err(Redirect::to("/"))
        }
    }
}

pub async fn list_records(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> HandlerResult {
    let rtype = match resolve_type(&state, &context, &slug, "Invalid type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let filter = query.filter();
    let page = state.records.list(rtype, &filter, query.page()).await?;

    let rows: Vec<Value> = page
        .items
        .iter()
        .map(|record| {
            json!({
                "id": record.id,
                "cells": record.cells(),
                "edit_url": format!("/{}/edit/{}", rtype.slug(), record.id),
                "delete_url": format!("/{}/delete/{}", rtype.slug(), record.id),
            })
        })
        .collect();

    let links = pagination(page.page, page.total_pages, page.total_items, |number| {
        format!("/{}?{}", rtype.slug(), query_string(&filter, Some(number)))
    });

    let data = json!({
        "rtype": type_json(rtype),
        "headers": rtype.column_names(),
        "column_span": rtype.columns().len() + 1,
        "rows": rows,
        "fields": form_fields(rtype, None),
        "q": filter.q.clone().unwrap_or_default(),
        "month": filter.month.clone().unwrap_or_default(),
        "year": filter.year.clone().unwrap_or_default(),
        "months": month_options(filter.month.as_deref()),
        "page": links,
        "print_url": print_url(rtype, &filter, false),
        "csv_url": print_url(rtype, &filter, true),
    });

    let page = state.render(Some(&context), "records", rtype.title(), data).await?;
    Ok(page.into_response())
}

pub async fn create_record(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Path(slug): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> HandlerResult {
    let rtype = match resolve_type(&state, &context, &slug, "Invalid type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let back = format!("/{}", rtype.slug());

    match state.records.create(&context, rtype, &form).await {
        Ok(_) => {
            state
                .flash(&context, FlashMessage::success(format!("{} created!", rtype.title())))
                .await;
            Ok(Redirect::to(&back).into_response())
        }
        Err(err) => state.flash_error(&context, err, &back).await,
    }
}

pub async fn edit_record_page(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Path((slug, id)): Path<(String, i32)>,
) -> HandlerResult {
    let rtype = match resolve_type(&state, &context, &slug, "Invalid type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let record = state.records.get(rtype, id).await?;
    let data = json!({
        "rtype": type_json(rtype),
        "id": record.id,
        "fields": form_fields(rtype, Some(&record)),
    });

    let title = format!("Edit {}", rtype.title());
    let page = state.render(Some(&context), "edit", &title, data).await?;
    Ok(page.into_response())
}

pub async fn update_record(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Path((slug, id)): Path<(String, i32)>,
    Form(form): Form<HashMap<String, String>>,
) -> HandlerResult {
    let rtype = match resolve_type(&state, &context, &slug, "Invalid type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    match state.records.update(&context, rtype, id, &form).await {
        Ok(_) => {
            state
                .flash(&context, FlashMessage::success("Updated successfully!"))
                .await;
            Ok(Redirect::to(&format!("/{}", rtype.slug())).into_response())
        }
        Err(err) if err.kind() == CoreErrorKind::NotFound => Err(err.into()),
        Err(err) => {
            let back = format!("/{}/edit/{}", rtype.slug(), id);
            state.flash_error(&context, err, &back).await
        }
    }
}

pub async fn delete_record(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
    Path((slug, id)): Path<(String, i32)>,
) -> HandlerResult {
    let rtype = match resolve_type(&state, &context, &slug, "Invalid type").await {
        Ok(rtype) => rtype,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    state.records.delete(&context, rtype, id).await?;
    state
        .flash(&context, FlashMessage::success("Record deleted!"))
        .await;
    Ok(Redirect::to(&format!("/{}", rtype.slug())).into_response())
}

pub(crate) fn type_json(rtype: RecordType) -> Value {
    json!({ "slug": rtype.slug(), "title": rtype.title() })
}

/// Form inputs for a record type, pre-filled from `record` when editing.
fn form_fields(rtype: RecordType, record: Option<&Record>) -> Vec<Value> {
    field_descriptors(rtype)
        .into_iter()
        .map(|field| {
            let value = match record {
                Some(record) => record.display_value(field.name),
                None => field.default.unwrap_or_default().to_string(),
            };
            let options: Vec<Value> = field
                .options
                .iter()
                .map(|option| json!({ "value": option, "selected": *option == value }))
                .collect();

            json!({
                "name": field.name,
                "label": field.label,
                "input_kind": field.input_kind,
                "required": field.required,
                "value": value,
                "options": options,
            })
        })
        .collect()
}

fn month_options(selected: Option<&str>) -> Vec<Value> {
    let selected = selected.and_then(|month| month.trim().parse::<usize>().ok());
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(index, label)| {
            json!({
                "value": (index + 1).to_string(),
                "label": label,
                "selected": selected == Some(index + 1),
            })
        })
        .collect()
}

/// Month name for a valid filter, e.g. "March 2025".
pub(crate) fn period_label(filter: &RecordFilter) -> Option<String> {
    filter
        .month_year()
        .map(|(month, year)| format!("{} {}", MONTH_NAMES[(month - 1) as usize], year))
}

/// Link to the printable listing, or its CSV export, for the same filter.
pub(crate) fn print_url(rtype: RecordType, filter: &RecordFilter, csv: bool) -> String {
    let mut url = format!("/print?rtype={}", rtype.slug());
    let filter = query_string(filter, None);
    if !filter.is_empty() {
        url.push('&');
        url.push_str(&filter);
    }
    if csv {
        url.push_str("&export=csv");
    }
    url
}

fn query_string(filter: &RecordFilter, page: Option<u64>) -> String {
    let mut parts = Vec::new();
    for (key, value) in [("q", &filter.q), ("month", &filter.month), ("year", &filter.year)] {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            parts.push(format!("{}={}", key, encode_component(value)));
        }
    }
    if let Some(page) = page {
        parts.push(format!("page={}", page));
    }
    parts.join("&")
}

fn encode_component(value: &str) -> String {
    value
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (byte as char).to_string(),
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", byte),
        })
        .collect()
}
