use crate::models::{Comment, Post, Stats};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Create the posts table and its indexes if they do not exist yet.
///
/// Schema migrations are out of scope for this service; the schema is small
/// enough to bootstrap idempotently at startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            content TEXT NOT NULL,
            image_url TEXT,
            created_by TEXT NOT NULL,
            user_ip TEXT NOT NULL,
            is_hate_speech BOOLEAN NOT NULL DEFAULT FALSE,
            comments JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_posts_public_created_at \
         ON posts (created_at DESC) WHERE is_hate_speech = FALSE",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_by ON posts (created_by)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert a new post with its moderation flag decided in the same statement.
/// The store assigns `id` and `created_at`.
pub async fn create_post(
    pool: &PgPool,
    content: &str,
    image_url: Option<&str>,
    created_by: &str,
    user_ip: &str,
    is_hate_speech: bool,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (content, image_url, created_by, user_ip, is_hate_speech)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, content, image_url, created_by, user_ip, is_hate_speech, comments, created_at
        "#,
    )
    .bind(content)
    .bind(image_url)
    .bind(created_by)
    .bind(user_ip)
    .bind(is_hate_speech)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Find a post by ID
pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, content, image_url, created_by, user_ip, is_hate_speech, comments, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Public feed: posts that were not flagged, newest first
pub async fn list_public_posts(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, content, image_url, created_by, user_ip, is_hate_speech, comments, created_at
        FROM posts
        WHERE is_hate_speech = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// All posts by one author token, flagged posts included (the caller is the
/// author, so no visibility filter applies)
pub async fn list_posts_by_author(
    pool: &PgPool,
    created_by: &str,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, content, image_url, created_by, user_ip, is_hate_speech, comments, created_at
        FROM posts
        WHERE created_by = $1
        "#,
    )
    .bind(created_by)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Atomically append a comment to a post's thread.
///
/// The append is a single UPDATE against the JSONB array, so concurrent
/// appends to the same post serialize on the row and none are lost.
/// Returns `None` when the post does not exist.
pub async fn append_comment(
    pool: &PgPool,
    post_id: Uuid,
    comment: &Comment,
) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET comments = comments || jsonb_build_array($2)
        WHERE id = $1
        RETURNING id, content, image_url, created_by, user_ip, is_hate_speech, comments, created_at
        "#,
    )
    .bind(post_id)
    .bind(Json(comment))
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Count total posts and flagged posts over the unfiltered collection
pub async fn count_stats(pool: &PgPool) -> Result<Stats, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS total_posts, \
                COUNT(*) FILTER (WHERE is_hate_speech) AS hate_speech_posts \
         FROM posts",
    )
    .fetch_one(pool)
    .await?;

    Ok(Stats {
        total_posts: row.get("total_posts"),
        hate_speech_posts: row.get("hate_speech_posts"),
    })
}
