use axum::routing::{get, post};
use axum::Router;

use crate::blog::handlers;
use crate::state::AppState;

/// Every route here takes a `CurrentUser`, so anonymous visitors are sent to
/// the login page.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog/create", get(handlers::create_page).post(handlers::create))
        .route(
            "/blog/{id}/update",
            get(handlers::update_page).post(handlers::update),
        )
        .route("/blog/{id}/delete", post(handlers::delete))
}
