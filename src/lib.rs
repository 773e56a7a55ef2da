pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    ai_service::{AIService, ChatCompletionsBackend, CompletionBackend},
    candidate_service::CandidateService,
    job_service::JobService,
    screening_service::ScreeningService,
    user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub user_service: UserService,
    pub job_service: JobService,
    pub candidate_service: CandidateService,
    pub screening_service: ScreeningService,
    /// Cancelled on shutdown; each screening batch runs on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder().timeout(config.ai_timeout()).build()?;
        let backend = ChatCompletionsBackend::new(
            http_client,
            config.ai_api_url.clone(),
            config.groq_api_key.clone(),
        );
        Ok(Self::with_backend(pool, config, Arc::new(backend)))
    }

    /// Builds the state around any completion backend.
    pub fn with_backend(pool: PgPool, config: &Config, backend: Arc<dyn CompletionBackend>) -> Self {
        let user_service = UserService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let candidate_service = CandidateService::new(pool.clone());
        let ai_service = AIService::new(backend, config.ai_model.clone(), config.ai_timeout());
        let screening_service = ScreeningService::new(
            ai_service,
            Arc::new(candidate_service.clone()),
            config.screening_concurrency,
        );

        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_hours: config.token_ttl_hours,
            max_upload_bytes: config.max_upload_bytes,
            user_service,
            job_service,
            candidate_service,
            screening_service,
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login));

    let account_api = Router::new()
        .route("/api/screenings", post(routes::screening::create_screening))
        .route("/api/jobs", get(routes::jobs::list_jobs))
        .route(
            "/api/jobs/:id/candidates",
            get(routes::jobs::list_job_candidates),
        )
        .route(
            "/api/jobs/:id/export",
            get(routes::export::export_job_candidates),
        )
        .route("/api/stats", get(routes::jobs::get_stats))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer_auth,
        ));

    let max_upload_bytes = state.max_upload_bytes;
    public_api
        .merge(account_api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
