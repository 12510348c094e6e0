pub mod assets;
pub mod auth;
pub mod blog;
pub mod home;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::load_current_user;
use crate::state::AppState;

/// The full application: routes, the current-user middleware and request
/// tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(auth::router())
        .merge(blog::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
