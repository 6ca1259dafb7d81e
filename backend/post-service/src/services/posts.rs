/// Ingestion pipeline for submissions
///
/// Every post and comment enters storage through this service: optional
/// media upload, classification, moderation decision, then persistence.
/// A failure at any step aborts the whole submission, so no partially
/// written record can exist.
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::models::{Comment, Post};
use crate::services::classifier::HateSpeechClassifier;
use crate::services::media_store::MediaStorage;
use crate::services::moderation::{self, REJECTION_MESSAGE};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// A post submission captured from the transport layer.
#[derive(Debug)]
pub struct NewPost {
    pub content: String,
    /// Opaque caller-supplied author token
    pub created_by: String,
    /// Network origin, recorded verbatim
    pub user_ip: String,
    pub attachment: Option<Attachment>,
}

/// Raw attachment bytes as received, prior to upload.
#[derive(Debug)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// A comment submission captured from the transport layer.
#[derive(Debug)]
pub struct NewComment {
    pub content: String,
    pub created_by: String,
    pub user_ip: String,
}

/// Caller-visible result of a moderated submission.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Persisted and publicly visible; carries the full aggregate.
    Accepted(Post),
    /// Classified as hate speech; the caller only learns the rejection.
    Rejected(Rejection),
}

/// Rejection summary returned instead of the entity.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub message: String,
    /// Model confidence scaled to 0-100
    pub probability: f64,
}

impl Rejection {
    fn from_probability(probability: f64) -> Self {
        Self {
            message: REJECTION_MESSAGE.to_string(),
            probability: moderation::scale_probability(probability),
        }
    }
}

pub struct PostService {
    pool: PgPool,
    media: Arc<dyn MediaStorage>,
    classifier: Arc<dyn HateSpeechClassifier>,
}

impl PostService {
    pub fn new(
        pool: PgPool,
        media: Arc<dyn MediaStorage>,
        classifier: Arc<dyn HateSpeechClassifier>,
    ) -> Self {
        Self {
            pool,
            media,
            classifier,
        }
    }

    /// Run one post submission through the full pipeline.
    ///
    /// A flagged post is still persisted for audit and statistics, but the
    /// caller receives only the rejection summary.
    pub async fn create_post(&self, new_post: NewPost) -> Result<SubmissionOutcome> {
        let NewPost {
            content,
            created_by,
            user_ip,
            attachment,
        } = new_post;

        validate(&content, &created_by)?;

        // Upload failures abort here: no post row may reference an
        // attachment that was never durably written.
        let image_url = match attachment {
            Some(Attachment {
                data,
                file_name,
                content_type,
            }) => Some(self.media.store(data, &file_name, &content_type).await?),
            None => None,
        };

        let prediction = self
            .classifier
            .predict(&content, image_url.as_deref())
            .await?;
        let decision = moderation::decide(&prediction.result);

        let post = post_repo::create_post(
            &self.pool,
            &content,
            image_url.as_deref(),
            &created_by,
            &user_ip,
            decision.flagged,
        )
        .await?;

        if decision.flagged {
            tracing::warn!(
                post_id = %post.id,
                created_by = %post.created_by,
                probability = prediction.probability,
                "post flagged as hate speech; hidden from public listing"
            );
            return Ok(SubmissionOutcome::Rejected(Rejection::from_probability(
                prediction.probability,
            )));
        }

        Ok(SubmissionOutcome::Accepted(post))
    }

    /// Classify and append a comment to an existing post.
    ///
    /// A flagged comment is rejected outright and never stored; nothing
    /// about it is durably recorded.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        new_comment: NewComment,
    ) -> Result<SubmissionOutcome> {
        let NewComment {
            content,
            created_by,
            user_ip,
        } = new_comment;

        validate(&content, &created_by)?;

        if post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Post".to_string()));
        }

        let prediction = self.classifier.predict(&content, None).await?;
        let decision = moderation::decide(&prediction.result);

        if decision.flagged {
            tracing::warn!(
                %post_id,
                created_by = %created_by,
                user_ip = %user_ip,
                probability = prediction.probability,
                "comment flagged as hate speech; not appended"
            );
            return Ok(SubmissionOutcome::Rejected(Rejection::from_probability(
                prediction.probability,
            )));
        }

        let comment = Comment {
            content,
            created_by,
            created_at: Utc::now(),
        };

        let post = post_repo::append_comment(&self.pool, post_id, &comment)
            .await?
            .ok_or_else(|| AppError::NotFound("Post".to_string()))?;

        Ok(SubmissionOutcome::Accepted(post))
    }
}

fn validate(content: &str, created_by: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    if created_by.trim().is_empty() {
        return Err(AppError::Validation("guestId is required".to_string()));
    }
    Ok(())
}
