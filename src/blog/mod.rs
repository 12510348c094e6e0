//! Post operations. Everything here that mutates takes a `CurrentUser`, so
//! only logged-in callers can reach it.

pub mod handlers;

use crate::db::models::Post;
use crate::db::{posts, Store};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;

fn require_title(title: &str) -> AppResult<()> {
    if title.is_empty() {
        return Err(AppError::Validation("Title is required.".into()));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Post id {} doesn't exist.", id))
}

/// Every post with its author's username, newest first.
pub fn list_posts(store: &Store) -> AppResult<Vec<Post>> {
    let conn = store.connect()?;
    Ok(posts::list(&conn)?)
}

pub fn create_post(store: &Store, user: &CurrentUser, title: &str, body: &str) -> AppResult<i64> {
    require_title(title)?;
    let mut conn = store.connect()?;
    let id = posts::insert(&mut conn, user.id, title, body)?;
    tracing::info!("{} created post {}", user.username, id);
    Ok(id)
}

/// Fetch a post. With `check_author`, anyone but the author (including an
/// anonymous caller) gets `Forbidden`. A store failure is `Connection`,
/// never `NotFound`, so callers can't mistake it for a missing post.
pub fn get_post(
    store: &Store,
    id: i64,
    user: Option<&CurrentUser>,
    check_author: bool,
) -> AppResult<Post> {
    let conn = store.connect()?;
    let post = posts::find(&conn, id)?.ok_or_else(|| not_found(id))?;

    if check_author && user.map(|u| u.id) != Some(post.author_id) {
        tracing::warn!(
            "Post {} access denied for {}",
            id,
            user.map(|u| u.username.as_str()).unwrap_or("anonymous")
        );
        return Err(AppError::Forbidden);
    }

    Ok(post)
}

pub fn update_post(
    store: &Store,
    id: i64,
    user: &CurrentUser,
    title: &str,
    body: &str,
) -> AppResult<()> {
    get_post(store, id, Some(user), true)?;
    require_title(title)?;

    let mut conn = store.connect()?;
    if posts::update(&mut conn, id, user.id, title, body)? == 0 {
        return Err(not_found(id));
    }
    tracing::info!("{} updated post {}", user.username, id);
    Ok(())
}

pub fn delete_post(store: &Store, id: i64, user: &CurrentUser) -> AppResult<()> {
    get_post(store, id, Some(user), true)?;

    let mut conn = store.connect()?;
    if posts::delete(&mut conn, id, user.id)? == 0 {
        return Err(not_found(id));
    }
    tracing::info!("{} deleted post {}", user.username, id);
    Ok(())
}
