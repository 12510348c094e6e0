use axum::extract::{FromRef, FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use std::convert::Infallible;

use crate::auth::session;
use crate::db::models::User;
use crate::error::{AppError, DB_CONNECT_ERROR};

/// Represents the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Per-request context produced by the `load_current_user` middleware.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<CurrentUser>,
    /// A session cookie was presented but the store could not be asked who
    /// it belongs to. `user` is `None` in that case.
    pub store_unavailable: bool,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Why a login-only route turned the request away.
#[derive(Debug)]
pub enum LoginRejection {
    /// No valid session: go log in.
    Anonymous,
    /// The session could not be checked. Carries the request's cookie jar so
    /// the connection message can be flashed.
    StoreUnavailable(SignedCookieJar),
}

impl IntoResponse for LoginRejection {
    fn into_response(self) -> Response {
        match self {
            LoginRejection::Anonymous => Redirect::to("/auth/login").into_response(),
            LoginRejection::StoreUnavailable(jar) => {
                (session::flash(jar, DB_CONNECT_ERROR), Redirect::to("/")).into_response()
            }
        }
    }
}

/// Extractor that requires a logged-in user.
/// Anonymous requests are redirected to the login page before the handler
/// runs. If the store was down while loading the session, the connection
/// message is flashed and the request goes back to the index instead.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = LoginRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default();

        match ctx.user {
            Some(user) => Ok(user),
            None if ctx.store_unavailable => Err(LoginRejection::StoreUnavailable(
                SignedCookieJar::from_headers(&parts.headers, Key::from_ref(state)),
            )),
            None => Err(LoginRejection::Anonymous),
        }
    }
}

/// Optional user extractor, `None` for anonymous visitors.
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<RequestContext>()
                .and_then(|ctx| ctx.user.clone()),
        ))
    }
}

/// Numeric post id from the route. Anything that isn't an integer is a 404,
/// the same as an id that doesn't exist.
pub struct PostId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for PostId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(PostId(id)),
            Err(rejection) => {
                tracing::debug!("Bad post id in {}: {}", parts.uri.path(), rejection);
                Err(AppError::NotFound("Not Found".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};

    fn parts_with(ctx: Option<RequestContext>) -> Parts {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "alice".into(),
        }
    }

    fn key() -> Key {
        Key::from(&[7u8; 64])
    }

    #[tokio::test]
    async fn current_user_redirects_anonymous_to_login() {
        let mut parts = parts_with(Some(RequestContext::default()));
        let rejection = CurrentUser::from_request_parts(&mut parts, &key())
            .await
            .unwrap_err();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn current_user_reads_request_context() {
        let mut parts = parts_with(Some(RequestContext {
            user: Some(alice()),
            store_unavailable: false,
        }));
        let user = CurrentUser::from_request_parts(&mut parts, &key())
            .await
            .unwrap();
        assert_eq!(user, alice());
    }

    #[tokio::test]
    async fn current_user_flashes_when_store_was_unavailable() {
        let mut parts = parts_with(Some(RequestContext {
            user: None,
            store_unavailable: true,
        }));
        let rejection = CurrentUser::from_request_parts(&mut parts, &key())
            .await
            .unwrap_err();
        assert!(matches!(rejection, LoginRejection::StoreUnavailable(_)));

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(session::FLASH_COOKIE));
    }

    #[tokio::test]
    async fn maybe_user_without_context_is_anonymous() {
        let mut parts = parts_with(None);
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn request_context_defaults_when_middleware_did_not_run() {
        let mut parts = parts_with(None);
        let ctx = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(ctx.user.is_none());
        assert!(!ctx.store_unavailable);
    }
}
