use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::analysis::Analysis;
use crate::models::job::JobPosting;
use crate::services::ai_service::{AIService, AnalysisError};
use crate::services::candidate_service::CandidateStore;
use crate::services::extract_service::extract_text;

/// One uploaded résumé as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
    pub mime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Extraction,
    Request,
    Parse,
}

/// A document that produced no analysis, with enough context to retry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningFailure {
    pub filename: String,
    pub stage: FailureStage,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ScreeningFailure {
    fn extraction(filename: String, reason: impl Into<String>) -> Self {
        Self {
            filename,
            stage: FailureStage::Extraction,
            reason: reason.into(),
            raw_response: None,
        }
    }

    fn analysis(filename: String, err: &AnalysisError) -> Self {
        let stage = match err {
            AnalysisError::Request { .. } => FailureStage::Request,
            AnalysisError::Parse { .. } => FailureStage::Parse,
        };
        Self {
            filename,
            stage,
            reason: err.to_string(),
            raw_response: err.raw_response().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScreeningOutcome {
    /// Successful analyses, best score first; equal scores keep upload order.
    pub results: Vec<Analysis>,
    /// Per-document failures in upload order.
    pub failures: Vec<ScreeningFailure>,
    /// The batch was stopped before every document was processed.
    pub cancelled: bool,
}

enum DocumentResult {
    Analyzed {
        filename: String,
        analysis: Analysis,
        resume_text: String,
    },
    Failed(ScreeningFailure),
}

#[derive(Clone)]
pub struct ScreeningService {
    ai: AIService,
    store: Arc<dyn CandidateStore>,
    concurrency: usize,
}

impl ScreeningService {
    pub fn new(ai: AIService, store: Arc<dyn CandidateStore>, concurrency: usize) -> Self {
        Self {
            ai,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Screens a batch of résumés against `job`.
    ///
    /// Documents run through extraction then analysis, at most
    /// `concurrency` at a time, and are collected in upload order. A
    /// document that fails is recorded and skipped. Every success is saved
    /// as a candidate of `job`; a storage failure aborts the batch and is
    /// returned as the error.
    ///
    /// When `cancel` fires no further documents are started, in-flight work
    /// is dropped and the candidates saved so far are kept.
    pub async fn run(
        &self,
        job: &JobPosting,
        documents: Vec<UploadedDocument>,
        cancel: &CancellationToken,
    ) -> Result<ScreeningOutcome> {
        let total = documents.len();
        tracing::info!(job_id = %job.id, documents = total, concurrency = self.concurrency, "screening started");

        let description = job.description.as_str();
        let stream = futures::stream::iter(documents)
            .map(|doc| self.screen_document(doc, description))
            .buffered(self.concurrency);
        let mut stream = std::pin::pin!(stream);

        let mut outcome = ScreeningOutcome::default();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    None
                }
                next = stream.next() => next,
            };
            let Some(result) = next else { break };

            match result {
                DocumentResult::Analyzed {
                    filename,
                    analysis,
                    resume_text,
                } => {
                    let candidate = self
                        .store
                        .save_candidate(job, &analysis, &resume_text)
                        .await
                        .map_err(|err| {
                            tracing::error!(job_id = %job.id, filename = %filename, error = %err, "failed to save candidate, aborting batch");
                            err
                        })?;
                    tracing::info!(
                        candidate_id = %candidate.id,
                        filename = %filename,
                        match_score = analysis.match_score,
                        "candidate screened"
                    );
                    outcome.results.push(analysis);
                }
                DocumentResult::Failed(failure) => {
                    tracing::warn!(
                        filename = %failure.filename,
                        stage = ?failure.stage,
                        reason = %failure.reason,
                        "document skipped"
                    );
                    outcome.failures.push(failure);
                }
            }
        }

        // `sort_by` is stable, so equal scores keep upload order.
        outcome
            .results
            .sort_by(|a, b| b.match_score.cmp(&a.match_score));

        if outcome.cancelled {
            tracing::warn!(job_id = %job.id, processed = outcome.results.len() + outcome.failures.len(), documents = total, "screening cancelled");
        } else {
            tracing::info!(job_id = %job.id, screened = outcome.results.len(), failed = outcome.failures.len(), "screening finished");
        }
        Ok(outcome)
    }

    async fn screen_document(&self, doc: UploadedDocument, job_description: &str) -> DocumentResult {
        let UploadedDocument {
            filename,
            bytes,
            mime,
        } = doc;

        let extracted = tokio::task::spawn_blocking(move || extract_text(&bytes, &mime)).await;
        let resume_text = match extracted {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => {
                return DocumentResult::Failed(ScreeningFailure::extraction(
                    filename,
                    "no text could be extracted",
                ))
            }
            Ok(Err(err)) => {
                return DocumentResult::Failed(ScreeningFailure::extraction(filename, err.to_string()))
            }
            Err(err) => {
                return DocumentResult::Failed(ScreeningFailure::extraction(
                    filename,
                    format!("extraction task failed: {}", err),
                ))
            }
        };

        match self.ai.analyze_resume(&resume_text, job_description).await {
            Ok(analysis) => DocumentResult::Analyzed {
                filename,
                analysis,
                resume_text,
            },
            Err(err) => {
                if let Some(raw) = err.raw_response() {
                    tracing::debug!(filename = %filename, raw_response = %raw, "unparsable analysis response");
                }
                DocumentResult::Failed(ScreeningFailure::analysis(filename, &err))
            }
        }
    }
}
