// Library exports for tinyblog
// This allows integration tests to drive the full router

pub mod auth;
pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
