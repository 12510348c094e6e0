use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::auth::session;
use crate::db::users;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, RequestContext};
use crate::state::AppState;

/// Runs before every route: resolves the session cookie to a user and
/// attaches a `RequestContext` to the request. Never rejects. A session that
/// can't be resolved leaves the request anonymous, and a store failure is
/// recorded in the context so handlers don't wait on the pool a second time.
pub async fn load_current_user(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match session::user_id(&jar, &state.config.auth.session_cookie) {
        Some(user_id) => match lookup(&state, user_id) {
            Ok(user) => RequestContext {
                user,
                store_unavailable: false,
            },
            Err(e) => {
                tracing::warn!("Could not load user {} for session: {}", user_id, e);
                RequestContext {
                    user: None,
                    store_unavailable: true,
                }
            }
        },
        None => RequestContext::default(),
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

fn lookup(state: &AppState, user_id: i64) -> AppResult<Option<CurrentUser>> {
    let conn = state.store.connect()?;
    let user = users::find_by_id(&conn, user_id)?;
    if user.is_none() {
        tracing::debug!("Session refers to missing user {}", user_id);
    }
    Ok(user.map(CurrentUser::from))
}
