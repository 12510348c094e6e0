use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::auth::session;
use crate::blog;
use crate::db::models::Post;
use crate::error::{AppError, AppResult, DB_CONNECT_ERROR};
use crate::extractors::{CurrentUser, RequestContext};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct IndexTemplate {
    pub user: Option<CurrentUser>,
    pub messages: Vec<String>,
    /// `None` when the store could not be reached, as opposed to no posts.
    pub posts: Option<Vec<Post>>,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET / — public list of posts
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: SignedCookieJar,
) -> AppResult<Response> {
    let (jar, mut messages) = session::take_flash(jar);

    // The middleware already waited on the pool once for this request.
    let listed = if ctx.store_unavailable {
        Err(AppError::Connection)
    } else {
        blog::list_posts(&state.store)
    };

    let posts = match listed {
        Ok(posts) => Some(posts),
        Err(AppError::Connection) => {
            if !messages.iter().any(|m| m == DB_CONNECT_ERROR) {
                messages.push(DB_CONNECT_ERROR.to_string());
            }
            None
        }
        Err(e) => return Err(e),
    };

    Ok((
        jar,
        Html(IndexTemplate {
            user: ctx.user,
            messages,
            posts,
        }),
    )
        .into_response())
}
