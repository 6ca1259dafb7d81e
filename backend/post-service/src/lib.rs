/// Post Service Library
///
/// Moderated post board: user submissions (text plus optional image) are
/// screened by an external hate-speech classifier before they become
/// publicly visible. Flagged posts stay stored for audit and statistics but
/// never appear in public listings; flagged comments are rejected outright.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Post aggregate, comments, statistics
/// - `services`: ingestion pipeline, moderation decision, external clients
/// - `db`: repository over PostgreSQL
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
