/// Comment handlers - HTTP endpoints for comment operations
use crate::error::{AppError, Result};
use crate::handlers::posts::client_ip;
use crate::services::posts::{NewComment, SubmissionOutcome};
use crate::services::PostService;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
    #[serde(rename = "guestId")]
    pub guest_id: String,
}

/// Append a comment to a post
///
/// Comment text goes through the same classification step as posts; a
/// flagged comment is rejected with a 200 rejection summary and never
/// stored.
pub async fn add_comment(
    service: web::Data<PostService>,
    req: HttpRequest,
    post_id: web::Path<String>,
    body: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    let post_id = Uuid::parse_str(&post_id)
        .map_err(|_| AppError::Validation("Invalid post ID".to_string()))?;

    let body = body.into_inner();
    let new_comment = NewComment {
        content: body.content,
        created_by: body.guest_id,
        user_ip: client_ip(&req),
    };

    match service.add_comment(post_id, new_comment).await? {
        SubmissionOutcome::Accepted(post) => Ok(HttpResponse::Created().json(post)),
        SubmissionOutcome::Rejected(rejection) => Ok(HttpResponse::Ok().json(rejection)),
    }
}
