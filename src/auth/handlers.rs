use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use crate::auth::{accounts, session};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::home::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub messages: Vec<String>,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub messages: Vec<String>,
}

// -- Request types --

/// Missing fields deserialize as empty and fail validation.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// -- Register --

/// GET /auth/register
pub async fn register_page(MaybeUser(user): MaybeUser) -> Html<RegisterTemplate> {
    Html(RegisterTemplate {
        user,
        messages: Vec::new(),
    })
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<Credentials>,
) -> AppResult<Response> {
    let result = accounts::register(
        &state.store,
        state.config.auth.bcrypt_cost,
        &form.username,
        &form.password,
    )
    .await;

    match result {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        Err(e) => {
            let message = e.recover()?;
            Ok(Html(RegisterTemplate {
                user,
                messages: vec![message],
            })
            .into_response())
        }
    }
}

// -- Login --

/// GET /auth/login
pub async fn login_page(MaybeUser(user): MaybeUser) -> Html<LoginTemplate> {
    Html(LoginTemplate {
        user,
        messages: Vec::new(),
    })
}

/// POST /auth/login — the session cookie is only issued after the
/// credentials check out.
pub async fn login(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: SignedCookieJar,
    Form(form): Form<Credentials>,
) -> AppResult<Response> {
    match accounts::login(&state.store, &form.username, &form.password).await {
        Ok(logged_in) => {
            let jar = session::start(jar, &state.config.auth.session_cookie, logged_in.id);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => {
            let message = e.recover()?;
            Ok(Html(LoginTemplate {
                user,
                messages: vec![message],
            })
            .into_response())
        }
    }
}

// -- Logout --

/// GET /auth/logout — safe to call when already logged out.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> impl IntoResponse {
    let jar = session::end(jar, &state.config.auth.session_cookie);
    (jar, Redirect::to("/"))
}
