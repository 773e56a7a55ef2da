use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::analysis::Analysis;
use crate::services::ai_prompts::{build_analysis_prompt, SYSTEM_PROMPT};

pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// One chat-completion call as sent to the external model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned no content")]
    EmptyContent,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {cause}")]
    Request { cause: RequestFailure },

    #[error("analysis response was unusable: {reason}")]
    Parse { reason: String, raw: String },
}

impl AnalysisError {
    /// Raw model output, kept for diagnostics on parse failures.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AnalysisError::Parse { raw, .. } => Some(raw),
            AnalysisError::Request { .. } => None,
        }
    }
}

/// The external completion service, reduced to "send a request, get text back".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RequestFailure>;
}

/// OpenAI-compatible `/chat/completions` endpoint (Groq by default).
#[derive(Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ChatCompletionsBackend {
    pub fn new(client: Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RequestFailure> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            temperature: f32,
            max_tokens: u32,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct RespChoiceMsg {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct RespChoice {
            message: RespChoiceMsg,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<RespChoice>,
        }

        let req = Req {
            model: &request.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: vec![
                Msg {
                    role: "system",
                    content: &request.system,
                },
                Msg {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RequestFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Resp = res.json().await.map_err(transport_failure)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
            .ok_or(RequestFailure::EmptyContent)
    }
}

fn transport_failure(err: reqwest::Error) -> RequestFailure {
    if err.is_timeout() {
        RequestFailure::Timeout(Duration::ZERO)
    } else {
        RequestFailure::Transport(err.to_string())
    }
}

#[derive(Clone)]
pub struct AIService {
    backend: Arc<dyn CompletionBackend>,
    model: String,
    timeout: Duration,
}

impl AIService {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: String, timeout: Duration) -> Self {
        Self {
            backend,
            model,
            timeout,
        }
    }

    /// Scores one résumé against a job description with exactly one call to
    /// the completion service. No retries.
    pub async fn analyze_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<Analysis, AnalysisError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user: build_analysis_prompt(resume_text, job_description),
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let raw = match tokio::time::timeout(self.timeout, self.backend.complete(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(RequestFailure::Timeout(_))) | Err(_) => {
                return Err(AnalysisError::Request {
                    cause: RequestFailure::Timeout(self.timeout),
                })
            }
            Ok(Err(cause)) => return Err(AnalysisError::Request { cause }),
        };

        tracing::debug!(response_len = raw.len(), "analysis response received");
        parse_analysis(&raw)
    }
}

/// Removes the code fences models like to wrap JSON in.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parses raw model output into an [`Analysis`].
///
/// Fences are stripped first; if the remainder still is not JSON, the
/// outermost `{...}` span is tried before giving up.
pub fn parse_analysis(raw: &str) -> Result<Analysis, AnalysisError> {
    let cleaned = strip_code_fences(raw);

    let value: JsonValue = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(first_err) => {
            let embedded = match (cleaned.find('{'), cleaned.rfind('}')) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&cleaned[start..=end]).ok()
                }
                _ => None,
            };
            embedded.ok_or_else(|| AnalysisError::Parse {
                reason: first_err.to_string(),
                raw: raw.to_string(),
            })?
        }
    };

    Analysis::from_model_json(&value).map_err(|reason| AnalysisError::Parse {
        reason,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::Recommendation;

    fn service(mock: MockCompletionBackend) -> AIService {
        AIService::new(Arc::new(mock), "test-model".into(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn fenced_response_is_stripped_and_parsed() {
        let mut mock = MockCompletionBackend::new();
        mock.expect_complete()
            .withf(|req| {
                req.model == "test-model"
                    && req.temperature == ANALYSIS_TEMPERATURE
                    && req.max_tokens == ANALYSIS_MAX_TOKENS
                    && req.system == SYSTEM_PROMPT
                    && req.user.contains("RESUME TEXT")
                    && req.user.contains("JOB TEXT")
            })
            .times(1)
            .returning(|_| {
                Ok("```json\n{\"match_score\": 85, \"name\": \"Jane Doe\", \"recommendation\": \"Strong Match\"}\n```"
                    .to_string())
            });

        let analysis = service(mock)
            .analyze_resume("RESUME TEXT", "JOB TEXT")
            .await
            .unwrap();
        assert_eq!(analysis.match_score, 85);
        assert_eq!(analysis.name, "Jane Doe");
        assert_eq!(analysis.recommendation, Some(Recommendation::StrongMatch));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error_with_raw_text() {
        let mut mock = MockCompletionBackend::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok("{\"match_score\": 85, \"name\": ".to_string()));

        let err = service(mock).analyze_resume("r", "j").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
        assert_eq!(err.raw_response(), Some("{\"match_score\": 85, \"name\": "));
    }

    #[tokio::test]
    async fn service_failure_is_a_request_error() {
        let mut mock = MockCompletionBackend::new();
        mock.expect_complete().times(1).returning(|_| {
            Err(RequestFailure::Status {
                status: 503,
                body: "overloaded".into(),
            })
        });

        let err = service(mock).analyze_resume("r", "j").await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Request {
                cause: RequestFailure::Status {
                    status: 503,
                    body: "overloaded".into()
                }
            }
        );
        assert_eq!(err.raw_response(), None);
    }

    struct StalledBackend;

    #[async_trait]
    impl CompletionBackend for StalledBackend {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, RequestFailure> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("{}".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_times_out() {
        let ai = AIService::new(Arc::new(StalledBackend), "m".into(), Duration::from_secs(30));
        let err = ai.analyze_resume("r", "j").await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Request {
                cause: RequestFailure::Timeout(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn prose_around_the_object_is_tolerated() {
        let analysis =
            parse_analysis("Here is the evaluation:\n{\"match_score\": 70}\nHope this helps!").unwrap();
        assert_eq!(analysis.match_score, 70);
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = parse_analysis("```json\n[1, 2]\n```").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { ref reason, .. } if reason.contains("object")));
    }

    #[test]
    fn objects_without_analysis_fields_are_parse_errors() {
        for raw in ["{}", r#"{"error":{"message":"rate limited"}}"#] {
            let err = parse_analysis(raw).unwrap_err();
            assert_eq!(err.raw_response(), Some(raw));
        }
    }

    #[test]
    fn model_supplied_unscored_flag_is_ignored() {
        let analysis = parse_analysis(r#"{"match_score": 85, "unscored": true}"#).unwrap();
        assert_eq!(analysis.match_score, 85);
        assert!(!analysis.unscored);
    }

    #[test]
    fn fence_variants() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}
