use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::analysis::Analysis;
use crate::models::candidate::Candidate;
use crate::models::job::JobPosting;

/// Where the screening pipeline records each successful analysis.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn save_candidate(
        &self,
        job: &JobPosting,
        analysis: &Analysis,
        resume_text: &str,
    ) -> Result<Candidate>;
}

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

const CANDIDATE_COLUMNS: &str = "id, job_id, user_id, name, email, phone, resume_text, match_score, analysis_result, created_at";

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records are append-only: there is no update path.
    pub async fn create_candidate(
        &self,
        job: &JobPosting,
        analysis: &Analysis,
        resume_text: &str,
    ) -> Result<Candidate> {
        let blob = serde_json::to_value(analysis)?;
        // Postgres TEXT cannot hold NUL, which the Latin-1 fallback may produce.
        let resume_text = resume_text.replace('\0', "");

        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            INSERT INTO candidates (job_id, user_id, name, email, phone, resume_text, match_score, analysis_result)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        ))
        .bind(job.id)
        .bind(job.user_id)
        .bind(analysis.display_name())
        .bind(&analysis.email)
        .bind(&analysis.phone)
        .bind(resume_text)
        .bind(analysis.match_score.clamp(0, 100))
        .bind(blob)
        .fetch_one(&self.pool)
        .await?;
        Ok(candidate)
    }

    /// Candidates for one job, best score first.
    pub async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidates
            WHERE job_id = $1
            ORDER BY match_score DESC, created_at ASC, id ASC
            "#
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateStore for CandidateService {
    async fn save_candidate(
        &self,
        job: &JobPosting,
        analysis: &Analysis,
        resume_text: &str,
    ) -> Result<Candidate> {
        self.create_candidate(job, analysis, resume_text).await
    }
}
