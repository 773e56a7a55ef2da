use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::job::JobPosting;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    pub total_jobs: i64,
    pub total_candidates: i64,
    pub average_match_score: Option<f64>,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_job(&self, user_id: Uuid, title: &str, description: &str) -> Result<JobPosting> {
        let job = sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO jobs (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, description, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    /// Looks a job up on behalf of `user_id`; other accounts' jobs are not found.
    pub async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<JobPosting> {
        sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT id, user_id, title, description, created_at
            FROM jobs
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))
    }

    pub async fn list_jobs(&self, user_id: Uuid) -> Result<Vec<JobPosting>> {
        let jobs = sqlx::query_as::<_, JobPosting>(
            r#"
            SELECT id, user_id, title, description, created_at
            FROM jobs
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn stats(&self, user_id: Uuid) -> Result<UsageStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs WHERE user_id = $1) AS total_jobs,
                (SELECT COUNT(*) FROM candidates WHERE user_id = $1) AS total_candidates,
                (SELECT AVG(match_score)::float8 FROM candidates WHERE user_id = $1) AS average_match_score
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UsageStats {
            total_jobs: row.try_get("total_jobs")?,
            total_candidates: row.try_get("total_candidates")?,
            average_match_score: row.try_get("average_match_score")?,
        })
    }
}
