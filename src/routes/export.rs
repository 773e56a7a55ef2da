use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::{
    error::Result, middleware::auth::Claims, services::export_service::ExportService, AppState,
};

/// Export a job's ranked candidates as XLSX
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/export",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "XLSX workbook"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn export_job_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.account_id()?;
    let job = state.job_service.get_job(user_id, id).await?;
    let candidates = state.candidate_service.list_by_job(job.id).await?;

    let buffer = ExportService::generate_candidates_xlsx(&job, &candidates)?;
    let filename = format!(
        "screening_{}_{}.xlsx",
        export_slug(&job.title),
        chrono::Utc::now().format("%Y%m%d")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}

/// ASCII-only file name fragment so the header value stays valid.
fn export_slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "job".to_string()
    } else {
        slug.chars().take(60).collect()
    }
}
