use serde::Serialize;

use crate::dto::job_dto::JobResponse;
use crate::models::analysis::{Analysis, ScoreTier};
use crate::services::screening_service::{ScreeningFailure, ScreeningOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct RankedAnalysis {
    pub rank: usize,
    pub tier: ScoreTier,
    #[serde(flatten)]
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResponse {
    pub job: JobResponse,
    pub results: Vec<RankedAnalysis>,
    pub failures: Vec<ScreeningFailure>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl ScreeningResponse {
    pub fn new(job: JobResponse, outcome: ScreeningOutcome) -> Self {
        let results = outcome
            .results
            .into_iter()
            .enumerate()
            .map(|(idx, analysis)| RankedAnalysis {
                rank: idx + 1,
                tier: analysis.tier(),
                analysis,
            })
            .collect();
        Self {
            job,
            results,
            failures: outcome.failures,
            cancelled: outcome.cancelled,
        }
    }
}
