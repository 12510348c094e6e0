use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use crate::auth::session;
use crate::blog;
use crate::error::{AppError, AppResult, DB_CONNECT_ERROR};
use crate::extractors::{CurrentUser, LoginRejection, PostId};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "blog/create.html")]
pub struct CreateTemplate {
    pub user: Option<CurrentUser>,
    pub messages: Vec<String>,
    pub title: String,
    pub body: String,
}

#[derive(Template)]
#[template(path = "blog/update.html")]
pub struct UpdateTemplate {
    pub user: Option<CurrentUser>,
    pub messages: Vec<String>,
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

/// Error that happened after the user already left the page: flash it and
/// go back to the index.
fn flash_and_return(jar: SignedCookieJar, err: AppError) -> AppResult<Response> {
    let message = err.recover()?;
    Ok((session::flash(jar, &message), Redirect::to("/")).into_response())
}

/// GET /blog/create
pub async fn create_page(user: CurrentUser) -> Html<CreateTemplate> {
    Html(CreateTemplate {
        user: Some(user),
        messages: Vec::new(),
        title: String::new(),
        body: String::new(),
    })
}

/// POST /blog/create
///
/// A store outage noticed while loading the session re-renders the form with
/// the connection message, keeping what was typed.
pub async fn create(
    State(state): State<AppState>,
    user: Result<CurrentUser, LoginRejection>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let user = match user {
        Ok(user) => user,
        Err(LoginRejection::StoreUnavailable(_)) => {
            return Ok(Html(CreateTemplate {
                user: None,
                messages: vec![DB_CONNECT_ERROR.to_string()],
                title: form.title,
                body: form.body,
            })
            .into_response())
        }
        Err(rejection) => return Ok(rejection.into_response()),
    };

    match blog::create_post(&state.store, &user, &form.title, &form.body) {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            let message = e.recover()?;
            Ok(Html(CreateTemplate {
                user: Some(user),
                messages: vec![message],
                title: form.title,
                body: form.body,
            })
            .into_response())
        }
    }
}

/// GET /blog/{id}/update
pub async fn update_page(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    PostId(id): PostId,
) -> AppResult<Response> {
    match blog::get_post(&state.store, id, Some(&user), true) {
        Ok(post) => Ok(Html(UpdateTemplate {
            user: Some(user),
            messages: Vec::new(),
            id: post.id,
            title: post.title,
            body: post.body,
        })
        .into_response()),
        Err(e) => flash_and_return(jar, e),
    }
}

/// POST /blog/{id}/update
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    PostId(id): PostId,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    match blog::update_post(&state.store, id, &user, &form.title, &form.body) {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            let message = e.recover()?;
            Ok(Html(UpdateTemplate {
                user: Some(user),
                messages: vec![message],
                id,
                title: form.title,
                body: form.body,
            })
            .into_response())
        }
    }
}

/// POST /blog/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    PostId(id): PostId,
) -> AppResult<Response> {
    match blog::delete_post(&state.store, id, &user) {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => flash_and_return(jar, e),
    }
}
