use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::auth::RequestContext;
use crate::server::app::AppState;
use crate::services::auth_service::SESSION_COOKIE;

/// Any logged-in user.
pub struct CurrentUser(pub RequestContext);

/// A logged-in admin.
pub struct AdminUser(pub RequestContext);

pub enum AuthRejection {
    Login,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login => Redirect::to("/login").into_response(),
            AuthRejection::Forbidden => (
                StatusCode::FORBIDDEN,
                Html("<h1>403 Forbidden</h1><p>Administrator access is required.</p>"),
            )
                .into_response(),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_cookie(&parts.headers).ok_or(AuthRejection::Login)?;

        match state.auth.resolve(&session_id).await {
            Ok(context) => Ok(CurrentUser(context)),
            Err(err) => {
                debug!("Rejecting session: {}", err);
                Err(AuthRejection::Login)
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(context) = CurrentUser::from_request_parts(parts, state).await?;
        if context.is_admin() {
            Ok(AdminUser(context))
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

/// Value of the session cookie, if the request carries one.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie_header(session_id: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, session_id, max_age_secs
    )
}

pub fn clear_session_cookie_header() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
