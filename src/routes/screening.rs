use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{job_dto::JobResponse, screening_dto::ScreeningResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    services::{extract_service::DocumentFormat, screening_service::UploadedDocument},
    AppState,
};

const GENERIC_MIME: &str = "application/octet-stream";
const MAX_TITLE_LEN: usize = 255;

/// Content type of an uploaded part: the declared one unless it is missing
/// or generic, in which case the file extension decides.
pub fn resolve_mime(declared: Option<&str>, filename: &str) -> String {
    let declared = declared
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case(GENERIC_MIME));
    match declared {
        Some(mime) => mime.to_string(),
        None => DocumentFormat::mime_for_filename(filename)
            .unwrap_or(GENERIC_MIME)
            .to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/api/screenings",
    responses(
        (status = 201, description = "Batch screened; per-file failures listed alongside results", body = Json<ScreeningResponse>),
        (status = 400, description = "Missing title, description or résumés"),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Storage is unavailable")
    )
)]
#[axum::debug_handler]
pub async fn create_screening(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let user_id = claims.account_id()?;

    let mut title = String::new();
    let mut description = String::new();
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await?,
            "description" => description = field.text().await?,
            "resumes" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("resume-{}", documents.len() + 1));
                let mime = resolve_mime(field.content_type(), &filename);
                let bytes = field.bytes().await?;
                documents.push(UploadedDocument {
                    filename,
                    bytes,
                    mime,
                });
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(Error::BadRequest("Job title and description are required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::BadRequest(format!(
            "Job title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    if documents.is_empty() {
        return Err(Error::BadRequest("At least one résumé is required".to_string()));
    }

    let job = state.job_service.create_job(user_id, title, description).await?;
    let cancel = state.shutdown.child_token();
    let outcome = state.screening_service.run(&job, documents, &cancel).await?;

    Ok((
        StatusCode::CREATED,
        Json(ScreeningResponse::new(JobResponse::from(job), outcome)),
    ))
}
