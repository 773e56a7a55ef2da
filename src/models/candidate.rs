use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::Analysis;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub resume_text: String,
    pub match_score: i32,
    pub analysis_result: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// Decodes the stored analysis blob, applying the same defaults as for
    /// fresh model output. A corrupt blob still yields a record carrying
    /// the queryable columns.
    pub fn analysis(&self) -> Analysis {
        Analysis::from_json(&self.analysis_result).unwrap_or_else(|| Analysis {
            match_score: self.match_score,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            ..Default::default()
        })
    }
}
