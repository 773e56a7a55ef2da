use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Hiring recommendation returned by the model, one of four fixed labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Match")]
    StrongMatch,
    #[serde(rename = "Good Match")]
    GoodMatch,
    #[serde(rename = "Moderate Match")]
    ModerateMatch,
    #[serde(rename = "Weak Match")]
    WeakMatch,
}

impl Recommendation {
    pub const ALL: [Recommendation; 4] = [
        Recommendation::StrongMatch,
        Recommendation::GoodMatch,
        Recommendation::ModerateMatch,
        Recommendation::WeakMatch,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongMatch => "Strong Match",
            Recommendation::GoodMatch => "Good Match",
            Recommendation::ModerateMatch => "Moderate Match",
            Recommendation::WeakMatch => "Weak Match",
        }
    }

    /// Exact labels match case-insensitively. Otherwise the leading word
    /// decides ("strong match!", "Weak Match (not strong enough)"), and last
    /// a capitalized tier keyword anywhere in the text.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(exact) = Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(trimmed))
        {
            return Some(exact);
        }

        let lowered = trimmed.to_lowercase();
        if let Some(leading) = Self::ALL
            .into_iter()
            .find(|r| lowered.starts_with(&r.keyword().to_lowercase()))
        {
            return Some(leading);
        }

        Self::ALL.into_iter().find(|r| trimmed.contains(r.keyword()))
    }

    fn keyword(&self) -> &'static str {
        match self {
            Recommendation::StrongMatch => "Strong",
            Recommendation::GoodMatch => "Good",
            Recommendation::ModerateMatch => "Moderate",
            Recommendation::WeakMatch => "Weak",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Visual emphasis band used when rendering a ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl ScoreTier {
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            ScoreTier::Excellent
        } else if score >= 70 {
            ScoreTier::Good
        } else if score >= 60 {
            ScoreTier::Moderate
        } else {
            ScoreTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "excellent",
            ScoreTier::Good => "good",
            ScoreTier::Moderate => "moderate",
            ScoreTier::Low => "low",
        }
    }
}

/// Structured evaluation of one résumé against one job description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub match_score: i32,
    /// Set when the model returned no usable score; `match_score` is then 0.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unscored: bool,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub current_role: String,
    pub years_of_experience: String,
    pub top_skills: Vec<String>,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub education: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendation: Option<Recommendation>,
    pub interview_questions: Vec<String>,
    pub summary: String,
}

impl Analysis {
    /// Keys the model is asked to produce, in prompt order.
    pub const FIELDS: [&'static str; 15] = [
        "match_score",
        "name",
        "email",
        "phone",
        "current_role",
        "years_of_experience",
        "top_skills",
        "technical_skills",
        "soft_skills",
        "education",
        "strengths",
        "concerns",
        "recommendation",
        "interview_questions",
        "summary",
    ];

    /// Decodes a stored analysis blob, defaulting every absent or mistyped
    /// field instead of rejecting the whole object. The `unscored` marker
    /// written by [`Analysis`]'s own serializer is honored.
    ///
    /// Returns `None` only when `value` is not a JSON object.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let obj = value.as_object()?;
        let flagged = obj.get("unscored").and_then(|v| v.as_bool()).unwrap_or(false);
        Some(Self::decode(obj, flagged))
    }

    /// Decodes untrusted model output.
    ///
    /// The object must carry at least one of [`Analysis::FIELDS`]; anything
    /// else (an empty object, a provider error envelope) is rejected with a
    /// reason. A model-supplied `unscored` key is ignored.
    pub fn from_model_json(value: &JsonValue) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;
        if !Self::FIELDS.iter().any(|key| obj.contains_key(*key)) {
            let keys = obj.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
            return Err(format!("object has none of the analysis fields (keys: [{}])", keys));
        }
        Ok(Self::decode(obj, false))
    }

    fn decode(obj: &Map<String, JsonValue>, flagged_unscored: bool) -> Self {
        let score = obj
            .get("match_score")
            .and_then(coerce_score)
            .filter(|_| !flagged_unscored);

        Self {
            match_score: score.unwrap_or(0),
            unscored: score.is_none(),
            name: text_field(obj, "name"),
            email: text_field(obj, "email"),
            phone: text_field(obj, "phone"),
            current_role: text_field(obj, "current_role"),
            years_of_experience: text_field(obj, "years_of_experience"),
            top_skills: list_field(obj, "top_skills"),
            technical_skills: list_field(obj, "technical_skills"),
            soft_skills: list_field(obj, "soft_skills"),
            education: text_field(obj, "education"),
            strengths: list_field(obj, "strengths"),
            concerns: list_field(obj, "concerns"),
            recommendation: obj
                .get("recommendation")
                .and_then(|v| v.as_str())
                .and_then(Recommendation::parse_lenient),
            interview_questions: list_field(obj, "interview_questions"),
            summary: text_field(obj, "summary"),
        }
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.match_score)
    }

    /// Name for display, with the placeholder used when the model found none.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown Candidate"
        } else {
            &self.name
        }
    }
}

fn coerce_score(v: &JsonValue) -> Option<i32> {
    let score = match v {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        },
        JsonValue::String(s) => s.trim().trim_end_matches('%').trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (0..=100).contains(&score).then_some(score as i32)
}

fn scalar_to_string(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, JsonValue>, key: &str) -> String {
    obj.get(key).and_then(scalar_to_string).unwrap_or_default()
}

fn list_field(obj: &Map<String, JsonValue>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
