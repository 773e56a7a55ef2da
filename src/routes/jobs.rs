use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::job_dto::{CandidateListResponse, CandidateResponse, JobListResponse, JobResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "The account's jobs, newest first", body = Json<JobListResponse>),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.account_id()?;
    let jobs = state.job_service.list_jobs(user_id).await?;
    Ok(Json(JobListResponse {
        items: jobs.into_iter().map(JobResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/candidates",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Candidates ranked by match score", body = Json<CandidateListResponse>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn list_job_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.account_id()?;
    let job = state.job_service.get_job(user_id, id).await?;
    let candidates = state.candidate_service.list_by_job(job.id).await?;

    let items = candidates
        .into_iter()
        .enumerate()
        .map(|(idx, c)| CandidateResponse::ranked(idx + 1, c))
        .collect();
    Ok(Json(CandidateListResponse {
        job: JobResponse::from(job),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Usage totals for the account")
    )
)]
#[axum::debug_handler]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.account_id()?;
    let stats = state.job_service.stats(user_id).await?;
    Ok(Json(stats))
}
