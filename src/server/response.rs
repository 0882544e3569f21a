use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::auth::RequestContext;
use crate::errors::{AuthError, CoreError, CoreErrorKind};
use crate::schema::RecordType;
use crate::server::app::AppState;
use crate::services::auth_service::FlashMessage;

/// Service error turned into an HTTP response.
#[derive(Debug)]
pub struct AppError(pub CoreError);

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
            CoreErrorKind::Validation | CoreErrorKind::Conflict => StatusCode::BAD_REQUEST,
            CoreErrorKind::Forbidden => StatusCode::FORBIDDEN,
            CoreErrorKind::Unauthorized => return Redirect::to("/login").into_response(),
            CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if self.0.is_user_facing() {
            self.0.message().to_string()
        } else {
            error!("Request failed: {}", self.0);
            "Something went wrong. Please try again.".to_string()
        };

        let body = format!(
            "<h1>{}</h1><p>{}</p><a href=\"/\">Back to dashboard</a>",
            status,
            handlebars::html_escape(&message)
        );
        (status, Html(body)).into_response()
    }
}

pub type HandlerResult<T = Response> = Result<T, AppError>;

impl AppState {
    /// Renders a page inside the layout. Pending flash messages of the
    /// session are consumed.
    pub async fn render(
        &self,
        context: Option<&RequestContext>,
        template: &str,
        title: &str,
        data: Value,
    ) -> HandlerResult<Html<String>> {
        let mut page = Map::new();
        page.insert("title".into(), json!(title));
        page.insert("nav".into(), nav_items());

        if let Some(context) = context {
            page.insert(
                "user".into(),
                json!({
                    "username": context.username,
                    "role": context.role.as_str(),
                    "is_admin": context.is_admin(),
                }),
            );
            page.insert("flashes".into(), json!(self.take_flashes(context).await));
        }

        if let Value::Object(data) = data {
            page.extend(data);
        }

        self.templates
            .render(template, &Value::Object(page))
            .map(Html)
            .map_err(|err| CoreError::internal(format!("Failed to render {}: {}", template, err)).into())
    }

    /// Queues a message for the next page. Failures are logged, not raised.
    pub async fn flash(&self, context: &RequestContext, message: FlashMessage) {
        let Some(session_id) = context.session_id.as_deref() else {
            return;
        };
        if let Err(err) = self.auth.push_flash(session_id, message).await {
            warn!("Could not store flash message: {}", err);
        }
    }

    /// Flashes a user-facing error and redirects; anything else becomes an
    /// error response.
    pub async fn flash_error(&self, context: &RequestContext, err: CoreError, to: &str) -> HandlerResult {
        if !err.is_user_facing() {
            return Err(err.into());
        }
        self.flash(context, FlashMessage::danger(err.message())).await;
        Ok(Redirect::to(to).into_response())
    }

    async fn take_flashes(&self, context: &RequestContext) -> Vec<FlashMessage> {
        let Some(session_id) = context.session_id.as_deref() else {
            return Vec::new();
        };
        self.auth.take_flash(session_id).await.unwrap_or_else(|err| {
            warn!("Could not read flash messages: {}", err);
            Vec::new()
        })
    }
}

fn nav_items() -> Value {
    Value::Array(
        RecordType::ALL
            .iter()
            .map(|rtype| json!({ "slug": rtype.slug(), "title": rtype.title() }))
            .collect(),
    )
}

/// Previous/next links for a paginated listing.
pub fn pagination(page: u64, total_pages: u64, total_items: u64, link: impl Fn(u64) -> String) -> Value {
    json!({
        "page": page,
        "total_pages": total_pages,
        "total_items": total_items,
        "has_previous": page > 1,
        "has_next": page < total_pages,
        "previous_url": link(page.saturating_sub(1).max(1)),
        "next_url": link(page + 1),
    })
}
