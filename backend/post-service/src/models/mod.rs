/// Data models for the post service
///
/// The `Post` aggregate is stored document-style: one row per post, with the
/// comment thread held in a JSONB array column. Public JSON uses camelCase
/// field names, which is the wire shape clients already speak.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-submitted post together with its comment thread.
///
/// `is_hate_speech` is decided exactly once, in the same statement that
/// first persists the row, and is never revised. Flagged posts stay stored
/// for audit and statistics but are excluded from public listings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    /// Locator of the stored attachment, if one was supplied at creation
    pub image_url: Option<String>,
    /// Opaque caller-supplied author token; not authenticated
    pub created_by: String,
    /// Network origin captured at creation, recorded verbatim
    pub user_ip: String,
    pub is_hate_speech: bool,
    /// Append-only comment thread, oldest first
    #[sqlx(json)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

/// A comment owned by exactly one post.
///
/// Comments carry no moderation flag: a flagged comment is rejected before
/// it is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate moderation statistics over the full, unfiltered collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_posts: i64,
    pub hate_speech_posts: i64,
}
