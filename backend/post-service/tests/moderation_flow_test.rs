//! Integration Tests: Moderation Ingestion Pipeline
//!
//! Exercises the full submission pipeline against a real Postgres database,
//! with the prediction service and media store replaced by in-process fakes.
//!
//! Coverage:
//! - Accepted posts are persisted and publicly listed
//! - Flagged posts are persisted for audit but hidden from the public feed
//! - Media or classifier failure aborts the submission with no partial row
//! - Comments: missing post, flagged comment, concurrent appends
//! - Aggregate statistics over mixed collections
//!
//! Architecture:
//! - Uses testcontainers for the PostgreSQL database (requires a local
//!   Docker daemon, so these tests are ignored by default)
//! - Fakes the external classifier and object store
//! - Tests the real ingestion pipeline and repository

mod common;

use common::{
    setup_test_db, FailingClassifier, FailingMediaStore, RecordingMediaStore, StaticClassifier,
};
use post_service::db::post_repo;
use post_service::error::AppError;
use post_service::services::posts::{
    Attachment, NewComment, NewPost, PostService, SubmissionOutcome,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

const CLEAN_LABEL: &str = "Not Hate Speech";
const FLAGGED_LABEL: &str = "Hate Speech";

fn new_post(content: &str, guest: &str) -> NewPost {
    NewPost {
        content: content.to_string(),
        created_by: guest.to_string(),
        user_ip: "203.0.113.7".to_string(),
        attachment: None,
    }
}

fn new_comment(content: &str, guest: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
        created_by: guest.to_string(),
        user_ip: "203.0.113.8".to_string(),
    }
}

fn clean_service(pool: &PgPool) -> PostService {
    PostService::new(
        pool.clone(),
        Arc::new(RecordingMediaStore::new()),
        Arc::new(StaticClassifier::new(CLEAN_LABEL, 0.1)),
    )
}

fn flagging_service(pool: &PgPool) -> PostService {
    PostService::new(
        pool.clone(),
        Arc::new(RecordingMediaStore::new()),
        Arc::new(StaticClassifier::new(FLAGGED_LABEL, 0.93)),
    )
}

async fn total_posts(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .expect("count query")
}

fn expect_accepted(outcome: SubmissionOutcome) -> post_service::models::Post {
    match outcome {
        SubmissionOutcome::Accepted(post) => post,
        SubmissionOutcome::Rejected(rejection) => {
            panic!("expected accepted outcome, got rejection: {rejection:?}")
        }
    }
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn accepted_post_is_persisted_and_publicly_listed() {
    let pool = setup_test_db().await.expect("test database");
    let service = clean_service(&pool);

    let post = expect_accepted(
        service
            .create_post(new_post("hello", "g1"))
            .await
            .expect("create post"),
    );

    assert!(!post.is_hate_speech);
    assert!(post.comments.is_empty());
    assert_eq!(post.created_by, "g1");

    let public = post_repo::list_public_posts(&pool).await.expect("list");
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, post.id);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn flagged_post_is_hidden_but_kept_for_audit() {
    let pool = setup_test_db().await.expect("test database");
    let service = flagging_service(&pool);

    let outcome = service
        .create_post(new_post("attack text", "g2"))
        .await
        .expect("create post");

    match outcome {
        SubmissionOutcome::Rejected(rejection) => {
            assert_eq!(rejection.message, "Error: Hate Speech Detected");
            assert!((rejection.probability - 93.0).abs() < 1e-9);
        }
        SubmissionOutcome::Accepted(post) => panic!("expected rejection, got post {}", post.id),
    }

    // Hidden from the public feed
    let public = post_repo::list_public_posts(&pool).await.expect("list");
    assert!(public.is_empty());

    // Still visible to the author and counted in statistics
    let mine = post_repo::list_posts_by_author(&pool, "g2")
        .await
        .expect("author list");
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_hate_speech);

    let stats = post_repo::count_stats(&pool).await.expect("stats");
    assert_eq!(stats.total_posts, 1);
    assert_eq!(stats.hate_speech_posts, 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn accepted_post_keeps_its_media_locator() {
    let pool = setup_test_db().await.expect("test database");
    let media = Arc::new(RecordingMediaStore::new());
    let service = PostService::new(
        pool.clone(),
        media.clone(),
        Arc::new(StaticClassifier::new(CLEAN_LABEL, 0.2)),
    );

    let mut post = new_post("look at this", "g1");
    post.attachment = Some(Attachment {
        data: vec![0xff, 0xd8, 0xff],
        file_name: "cat.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    });

    let stored = expect_accepted(service.create_post(post).await.expect("create post"));

    assert_eq!(stored.image_url.as_deref(), Some("https://media.test/cat.jpg"));
    assert_eq!(media.stored(), vec!["https://media.test/cat.jpg".to_string()]);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn media_failure_aborts_the_submission() {
    let pool = setup_test_db().await.expect("test database");
    let classifier = Arc::new(StaticClassifier::new(CLEAN_LABEL, 0.1));
    let service = PostService::new(pool.clone(), Arc::new(FailingMediaStore), classifier.clone());

    let mut post = new_post("with image", "g3");
    post.attachment = Some(Attachment {
        data: vec![1, 2, 3],
        file_name: "cat.png".to_string(),
        content_type: "image/png".to_string(),
    });

    let err = service.create_post(post).await.unwrap_err();

    assert!(matches!(err, AppError::Upload(_)));
    // The pipeline aborted before classification and persistence
    assert_eq!(classifier.call_count(), 0);
    assert_eq!(total_posts(&pool).await, 0);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn classifier_failure_aborts_the_submission() {
    let pool = setup_test_db().await.expect("test database");
    let service = PostService::new(
        pool.clone(),
        Arc::new(RecordingMediaStore::new()),
        Arc::new(FailingClassifier),
    );

    let err = service
        .create_post(new_post("hello", "g1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Classification(_)));
    assert_eq!(total_posts(&pool).await, 0);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn comment_on_missing_post_is_not_found() {
    let pool = setup_test_db().await.expect("test database");
    let classifier = Arc::new(StaticClassifier::new(CLEAN_LABEL, 0.1));
    let service = PostService::new(
        pool.clone(),
        Arc::new(RecordingMediaStore::new()),
        classifier.clone(),
    );

    let err = service
        .add_comment(Uuid::new_v4(), new_comment("nice", "g1"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    // The missing post short-circuits before the classifier is consulted
    assert_eq!(classifier.call_count(), 0);
    assert_eq!(total_posts(&pool).await, 0);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn flagged_comment_is_never_stored() {
    let pool = setup_test_db().await.expect("test database");

    let post = expect_accepted(
        clean_service(&pool)
            .create_post(new_post("hello", "g1"))
            .await
            .expect("create post"),
    );

    let outcome = flagging_service(&pool)
        .add_comment(post.id, new_comment("attack text", "g2"))
        .await
        .expect("add comment");

    assert!(matches!(outcome, SubmissionOutcome::Rejected(_)));

    let stored = post_repo::find_post_by_id(&pool, post.id)
        .await
        .expect("find post")
        .expect("post exists");
    assert!(stored.comments.is_empty());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn clean_comment_is_appended_to_the_thread() {
    let pool = setup_test_db().await.expect("test database");
    let service = clean_service(&pool);

    let post = expect_accepted(
        service
            .create_post(new_post("hello", "g1"))
            .await
            .expect("create post"),
    );

    let updated = expect_accepted(
        service
            .add_comment(post.id, new_comment("nice one", "g2"))
            .await
            .expect("add comment"),
    );

    assert_eq!(updated.id, post.id);
    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated.comments[0].content, "nice one");
    assert_eq!(updated.comments[0].created_by, "g2");
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn concurrent_comment_appends_lose_nothing() {
    let pool = setup_test_db().await.expect("test database");
    let service = Arc::new(clean_service(&pool));

    let post = expect_accepted(
        service
            .create_post(new_post("hello", "g1"))
            .await
            .expect("create post"),
    );

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let service = service.clone();
        let post_id = post.id;
        tasks.spawn(async move {
            service
                .add_comment(post_id, new_comment(&format!("comment {i}"), "g2"))
                .await
        });
    }

    while let Some(result) = tasks.join_next().await {
        let outcome = result.expect("task join").expect("add comment");
        assert!(matches!(outcome, SubmissionOutcome::Accepted(_)));
    }

    let stored = post_repo::find_post_by_id(&pool, post.id)
        .await
        .expect("find post")
        .expect("post exists");
    assert_eq!(stored.comments.len(), 10);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn stats_count_total_and_flagged_posts() {
    let pool = setup_test_db().await.expect("test database");
    let clean = clean_service(&pool);
    let flagging = flagging_service(&pool);

    for i in 0..3 {
        clean
            .create_post(new_post(&format!("post {i}"), "g1"))
            .await
            .expect("create post");
    }
    for i in 0..2 {
        flagging
            .create_post(new_post(&format!("bad post {i}"), "g2"))
            .await
            .expect("create post");
    }

    let stats = post_repo::count_stats(&pool).await.expect("stats");
    assert_eq!(stats.total_posts, 5);
    assert_eq!(stats.hate_speech_posts, 2);

    let public = post_repo::list_public_posts(&pool).await.expect("list");
    assert_eq!(public.len(), 3);
    assert!(public.iter().all(|post| !post.is_hate_speech));
}
