use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::{Analysis, ScoreTier};
use crate::models::candidate::Candidate;
use crate::models::job::JobPosting;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
}

/// A stored candidate as shown in a ranked list.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
    pub id: Uuid,
    pub rank: usize,
    pub tier: ScoreTier,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub match_score: i32,
    pub analysis: Analysis,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateListResponse {
    pub job: JobResponse,
    pub items: Vec<CandidateResponse>,
}

impl From<JobPosting> for JobResponse {
    fn from(value: JobPosting) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

impl CandidateResponse {
    /// `rank` is 1-based.
    pub fn ranked(rank: usize, candidate: Candidate) -> Self {
        let analysis = candidate.analysis();
        Self {
            id: candidate.id,
            rank,
            tier: ScoreTier::from_score(candidate.match_score),
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            match_score: candidate.match_score,
            analysis,
            created_at: candidate.created_at,
        }
    }
}
