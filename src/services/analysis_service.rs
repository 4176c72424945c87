//! Analysis Service - validate, review, persist
//!
//! ```text
//! Received ─▶ Validated ─▶ Analyzed ─▶ Persisted ─▶ Responded
//!    │            │            │            │
//!    └────────────┴────────────┴────────────┴─▶ Responded(error)
//! ```

use std::sync::Arc;
use std::time::Instant;

use super::analysis_repository::AnalysisRepository;
use super::llm::CodeReviewer;
use super::snippet_validator::validate_request;
use crate::config::LimitsConfig;
use crate::models::{AnalyzeSnippetRequest, SnippetAnalysisRecord};
use crate::utils::{ApiError, ApiResult};

pub struct AnalysisService {
    repository: AnalysisRepository,
    reviewer: Arc<dyn CodeReviewer>,
    limits: LimitsConfig,
}

impl AnalysisService {
    pub fn new(
        repository: AnalysisRepository,
        reviewer: Arc<dyn CodeReviewer>,
        limits: LimitsConfig,
    ) -> Self {
        Self { repository, reviewer, limits }
    }

    pub fn repository(&self) -> &AnalysisRepository {
        &self.repository
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Run one snippet through validation, the reviewer and the store.
    /// Nothing is persisted unless the review completed.
    pub async fn analyze_snippet(
        &self,
        req: AnalyzeSnippetRequest,
    ) -> ApiResult<SnippetAnalysisRecord> {
        let submission = validate_request(req, &self.limits).inspect_err(|e| {
            tracing::warn!("Rejected snippet analysis request: {}", e);
        })?;

        tracing::info!(
            "Analyzing snippet '{}' ({}, {} bytes)",
            submission.title,
            submission.language,
            submission.code.len()
        );

        let start = Instant::now();
        let analysis = self.reviewer.review(&submission).await.map_err(|e| {
            if e.is_configuration() {
                tracing::error!("LLM is not configured: {}", e);
            } else {
                tracing::error!("LLM analysis failed for '{}': {}", submission.title, e);
            }
            ApiError::from(e)
        })?;
        let latency_ms = start.elapsed().as_millis();

        let record = self
            .repository
            .insert(&submission, &analysis)
            .await
            .inspect_err(|e| tracing::error!("Failed to store analysis: {}", e))?;

        tracing::info!(
            "Stored analysis {} (bugs: {}, vulnerabilities: {}, latency: {}ms)",
            record.id,
            record.analysis.bugs.len(),
            record.analysis.vulnerabilities.len(),
            latency_ms
        );

        Ok(record)
    }

    /// All stored records, oldest first
    pub async fn list_snippets(&self) -> ApiResult<Vec<SnippetAnalysisRecord>> {
        let records = self
            .repository
            .list_all(self.limits.max_history)
            .await
            .inspect_err(|e| tracing::error!("Failed to list snippets: {}", e))?;

        tracing::debug!("Listed {} snippet records", records.len());
        Ok(records)
    }
}
