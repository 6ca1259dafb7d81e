use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use post_service::db;
use post_service::handlers;
use post_service::services::classifier::PredictApiClient;
use post_service::services::media_store::S3MediaStore;
use post_service::services::PostService;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: PgPool,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "post-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "post-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

/// Post Service
///
/// Accepts user-submitted posts and comments, screens each submission for
/// hate speech via an external prediction service, and serves the moderated
/// collection.
///
/// # Routes
///
/// - `POST /api/v1/posts` - Create a post (multipart: text + optional image)
/// - `GET  /api/v1/posts` - Public feed (unflagged posts, newest first)
/// - `GET  /api/v1/posts/me` - Posts by one author token
/// - `GET  /api/v1/posts/stats` - Moderation statistics
/// - `GET  /api/v1/posts/{post_id}` - Post detail with comments
/// - `POST /api/v1/posts/{post_id}/comments` - Append a comment
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Support container healthchecks via CLI subcommand: `healthcheck-http` or legacy `healthcheck`
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" || cmd == "healthcheck-http" {
                let url = "http://127.0.0.1:8080/api/v1/health";
                match reqwest::Client::new().get(url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match post_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Schema migrations are out of scope; bootstrap the schema idempotently
    if let Err(e) = db::ensure_schema(&db_pool).await {
        tracing::error!("Schema bootstrap failed: {}", e);
        eprintln!("ERROR: Failed to bootstrap schema: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Connected to database");

    // Initialize media storage
    let media_store = S3MediaStore::from_config(&config.s3).await;
    if let Err(e) = media_store.health_check().await {
        // Text-only posts keep working without the object store
        tracing::warn!("S3 connectivity check failed: {}", e);
    }

    // Initialize prediction service client
    let classifier = match PredictApiClient::from_config(&config.classifier) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Classifier client creation failed: {}", e);
            eprintln!("ERROR: Failed to create classifier client: {}", e);
            std::process::exit(1);
        }
    };

    let service_data = web::Data::new(PostService::new(
        db_pool.clone(),
        Arc::new(media_store),
        Arc::new(classifier),
    ));
    let pool_data = web::Data::new(db_pool.clone());
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(service_data.clone())
            .app_data(pool_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1/posts")
                    .service(
                        web::resource("")
                            .route(web::post().to(handlers::create_post))
                            .route(web::get().to(handlers::list_posts)),
                    )
                    .route("/me", web::get().to(handlers::my_posts))
                    .route("/stats", web::get().to(handlers::get_stats))
                    .service(
                        web::resource("/{post_id}").route(web::get().to(handlers::get_post)),
                    )
                    .route(
                        "/{post_id}/comments",
                        web::post().to(handlers::add_comment),
                    ),
            )
    })
    .bind(&http_bind_address)?
    .workers(4)
    .run()
    .await
}
