use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::Post;

const SELECT_POST: &str = "SELECT p.id, p.title, p.body, p.created, p.author_id, u.username \
     FROM posts p JOIN users u ON p.author_id = u.id";

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created: row.get(3)?,
        author_id: row.get(4)?,
        username: row.get(5)?,
    })
}

/// All posts, most recent first.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_POST} ORDER BY p.created DESC, p.id DESC"
    ))?;
    let posts = stmt
        .query_map([], post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("{SELECT_POST} WHERE p.id = ?1"),
        params![id],
        post_from_row,
    )
    .optional()
}

pub fn insert(conn: &mut Connection, author_id: i64, title: &str, body: &str) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO posts (title, body, author_id) VALUES (?1, ?2, ?3)",
        params![title, body, author_id],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// Updates title and body of a post owned by `author_id`. Returns the number
/// of rows changed; zero means the post is gone or belongs to someone else.
pub fn update(
    conn: &mut Connection,
    id: i64,
    author_id: i64,
    title: &str,
    body: &str,
) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let changed = tx.execute(
        "UPDATE posts SET title = ?1, body = ?2 WHERE id = ?3 AND author_id = ?4",
        params![title, body, id, author_id],
    )?;
    tx.commit()?;
    Ok(changed)
}

pub fn delete(conn: &mut Connection, id: i64, author_id: i64) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let deleted = tx.execute(
        "DELETE FROM posts WHERE id = ?1 AND author_id = ?2",
        params![id, author_id],
    )?;
    tx.commit()?;
    Ok(deleted)
}
