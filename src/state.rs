use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::db::Store;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub cookie_key: Key,
}

// Lets `SignedCookieJar` pull its signing key out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
