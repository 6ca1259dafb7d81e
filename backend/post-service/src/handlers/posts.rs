/// Post handlers - HTTP endpoints for post operations
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::services::posts::{Attachment, NewPost, SubmissionOutcome};
use crate::services::PostService;
use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Multipart payload for creating a post: text, an unauthenticated guest
/// token, and an optional image.
#[derive(Debug, MultipartForm)]
pub struct CreatePostForm {
    pub content: Text<String>,
    #[multipart(rename = "guestId")]
    pub guest_id: Text<String>,
    #[multipart(limit = "10MiB")]
    pub image: Option<Bytes>,
}

/// Network origin of a submission: the proxy-forwarded address when present,
/// otherwise the transport peer. Recorded verbatim, never validated.
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| {
            req.peer_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_default()
        })
}

/// Create a new post
///
/// Returns 201 with the stored post, or 200 with a rejection summary when
/// the content is classified as hate speech.
pub async fn create_post(
    service: web::Data<PostService>,
    req: HttpRequest,
    MultipartForm(form): MultipartForm<CreatePostForm>,
) -> Result<HttpResponse> {
    let attachment = form.image.map(|image| Attachment {
        file_name: image.file_name.clone().unwrap_or_default(),
        content_type: image
            .content_type
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        data: image.data.to_vec(),
    });

    let new_post = NewPost {
        content: form.content.0,
        created_by: form.guest_id.0,
        user_ip: client_ip(&req),
        attachment,
    };

    match service.create_post(new_post).await? {
        SubmissionOutcome::Accepted(post) => Ok(HttpResponse::Created().json(post)),
        SubmissionOutcome::Rejected(rejection) => Ok(HttpResponse::Ok().json(rejection)),
    }
}

/// Public feed: unflagged posts, newest first
pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let posts = post_repo::list_public_posts(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Posts belonging to one author token, flagged posts included
pub async fn my_posts(
    pool: web::Data<PgPool>,
    query: web::Query<AuthorQuery>,
) -> Result<HttpResponse> {
    let posts = post_repo::list_posts_by_author(pool.get_ref(), &query.user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Aggregate counts over the full, unfiltered collection
pub async fn get_stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let stats = post_repo::count_stats(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Get a post by ID
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<String>) -> Result<HttpResponse> {
    let post_id = Uuid::parse_str(&post_id)
        .map_err(|_| AppError::Validation("Invalid post ID".to_string()))?;

    match post_repo::find_post_by_id(pool.get_ref(), post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::NotFound("Post".to_string())),
    }
}
