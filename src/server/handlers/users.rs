use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Role;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::context::AdminUser;
use crate::server::response::HandlerResult;
use crate::services::auth_service::FlashMessage;

const USERS_PAGE: &str = "/users";

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
}

pub async fn list_users(State(state): State<AppState>, AdminUser(context): AdminUser) -> HandlerResult {
    let users: Vec<Value> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|user| {
            let role = user.role();
            json!({
                "id": user.id,
                "username": user.username,
                "role": role.as_str(),
                "role_options": role_options(role),
                "is_self": context.user_id == Some(user.id),
            })
        })
        .collect();

    let data = json!({
        "users": users,
        "roles": [Role::Staff.as_str(), Role::Admin.as_str()],
    });
    let page = state.render(Some(&context), "users", "Accounts", data).await?;
    Ok(page.into_response())
}

/// Select options for the role column, with the current role selected.
fn role_options(current: Role) -> Vec<Value> {
    [Role::Admin, Role::Staff]
        .iter()
        .map(|option| json!({ "value": option.as_str(), "selected": *option == current }))
        .collect()
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    Form(form): Form<CreateUserForm>,
) -> HandlerResult {
    let result = match form.role.parse::<Role>() {
        Ok(role) => {
            state
                .users
                .create(&context, &form.username, &form.password, role)
                .await
        }
        Err(err) => Err(CoreError::from(err)),
    };

    match result {
        Ok(user) => {
            state
                .flash(&context, FlashMessage::success(format!("User '{}' created", user.username)))
                .await;
            Ok(Redirect::to(USERS_PAGE).into_response())
        }
        Err(err) => state.flash_error(&context, err, USERS_PAGE).await,
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    Path(id): Path<i32>,
    Form(form): Form<UpdateUserForm>,
) -> HandlerResult {
    let result = match form.role.parse::<Role>() {
        Ok(role) => state.users.update(&context, id, &form.username, role).await,
        Err(err) => Err(CoreError::from(err)),
    };

    match result {
        Ok(user) => {
            state
                .flash(&context, FlashMessage::success(format!("User '{}' updated", user.username)))
                .await;
            Ok(Redirect::to(USERS_PAGE).into_response())
        }
        Err(err) => state.flash_error(&context, err, USERS_PAGE).await,
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    Path(id): Path<i32>,
) -> HandlerResult {
    match state.users.delete(&context, id).await {
        Ok(user) => {
            state
                .flash(&context, FlashMessage::success(format!("User '{}' deleted", user.username)))
                .await;
            Ok(Redirect::to(USERS_PAGE).into_response())
        }
        Err(err) => state.flash_error(&context, err, USERS_PAGE).await,
    }
}

pub async fn reset_password(
    State(state): State<AppState>,
    AdminUser(context): AdminUser,
    Path(id): Path<i32>,
    Form(form): Form<ResetPasswordForm>,
) -> HandlerResult {
    match state.users.reset_password(&context, id, &form.password).await {
        Ok(user) => {
            state
                .flash(
                    &context,
                    FlashMessage::success(format!("Password reset for '{}'", user.username)),
                )
                .await;
            Ok(Redirect::to(USERS_PAGE).into_response())
        }
        Err(err) => state.flash_error(&context, err, USERS_PAGE).await,
    }
}
