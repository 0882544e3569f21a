use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::errors::AuthError;
use crate::server::app::AppState;
use crate::server::context::{
    clear_session_cookie_header, session_cookie, session_cookie_header, CurrentUser,
};
use crate::server::response::HandlerResult;
use crate::services::auth_service::FlashMessage;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(query): Query<LoginQuery>,
) -> HandlerResult {
    if let Some(CurrentUser(context)) = user {
        return Ok(Redirect::to(context.role.dashboard_path()).into_response());
    }

    let notice = match query.notice.as_deref() {
        Some("logged_out") => Some("Logged out"),
        _ => None,
    };

    let page = state
        .render(None, "login", "Login", json!({ "notice": notice }))
        .await?;
    Ok(page.into_response())
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> HandlerResult {
    match state.auth.login(&form.username, &form.password).await {
        Ok((user, session)) => {
            let context = crate::auth::RequestContext::user(
                session.session_id.clone(),
                user.id,
                user.username.clone(),
                user.role(),
            );
            state
                .flash(&context, FlashMessage::success(format!("Logged in as {}", user.username)))
                .await;

            let max_age = (session.expires_at - session.created_at).num_seconds();
            let cookie = session_cookie_header(&session.session_id, max_age);
            Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let page = state
                .render(
                    None,
                    "login",
                    "Login",
                    json!({ "error": "Invalid credentials", "username": form.username }),
                )
                .await?;
            Ok(page.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_cookie(&headers) {
        match state.auth.logout(&session_id).await {
            Ok(()) | Err(AuthError::SessionNotFound) => {}
            Err(err) => warn!("Logout failed: {}", err),
        }
    }

    (
        [(SET_COOKIE, clear_session_cookie_header())],
        Redirect::to("/login?notice=logged_out"),
    )
        .into_response()
}
