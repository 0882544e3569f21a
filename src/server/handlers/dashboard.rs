use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde_json::json;

use crate::server::app::AppState;
use crate::server::context::CurrentUser;
use crate::server::response::HandlerResult;

pub async fn index(user: Option<CurrentUser>) -> Redirect {
    match user {
        Some(CurrentUser(context)) => Redirect::to(context.role.dashboard_path()),
        None => Redirect::to("/login"),
    }
}

/// Record counts per type.
pub async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
) -> HandlerResult {
    if !context.is_admin() {
        return Ok(Redirect::to(context.role.dashboard_path()).into_response());
    }

    let counts = state.records.counts().await?;
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    let counts: Vec<_> = counts
        .into_iter()
        .map(|(rtype, count)| json!({ "slug": rtype.slug(), "title": rtype.title(), "count": count }))
        .collect();

    let page = state
        .render(
            Some(&context),
            "dashboard_admin",
            "Dashboard",
            json!({ "counts": counts, "total": total }),
        )
        .await?;
    Ok(page.into_response())
}

pub async fn staff_dashboard(
    State(state): State<AppState>,
    CurrentUser(context): CurrentUser,
) -> HandlerResult {
    if context.is_admin() {
        return Ok(Redirect::to(context.role.dashboard_path()).into_response());
    }

    let page = state
        .render(Some(&context), "dashboard_staff", "Dashboard", json!({}))
        .await?;
    Ok(page.into_response())
}
