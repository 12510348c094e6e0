pub mod models;
pub mod posts;
pub mod users;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::time::Duration;

use crate::error::AppResult;
use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

pub type Connection = PooledConnection<SqliteConnectionManager>;

/// Handle to the relational store. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens a pool without touching the database. An unreachable file only
    /// shows up later, as `AppError::Connection` from [`Store::connect`].
    pub fn open(db_path: &Path, connect_timeout: Duration) -> Self {
        Self::new(create_pool(db_path, connect_timeout))
    }

    pub fn connect(&self) -> AppResult<Connection> {
        Ok(self.pool.get()?)
    }
}

pub fn create_pool(db_path: &Path, connect_timeout: Duration) -> DbPool {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Could not create {}: {}", parent.display(), e);
        }
    }

    // foreign_keys is per connection, so it goes in the init hook
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });

    Pool::builder()
        .max_size(8)
        .min_idle(Some(0))
        .connection_timeout(connect_timeout)
        .build_unchecked(manager)
}

pub fn run_migrations(store: &Store) -> anyhow::Result<()> {
    let conn = store.pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Drops all blog data and recreates the schema from scratch.
pub fn init_db(store: &Store) -> anyhow::Result<()> {
    {
        let mut conn = store.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "
            DROP TABLE IF EXISTS posts;
            DROP TABLE IF EXISTS users;
            DROP TABLE IF EXISTS schema_version;
            ",
        )?;
        tx.commit()?;
    }
    tracing::info!("Dropped existing tables");
    run_migrations(store)
}
