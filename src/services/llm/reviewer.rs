//! Reviewer abstraction used by the analysis service

use async_trait::async_trait;

use super::client::LLMClient;
use super::models::LLMError;
use crate::models::{CodeAnalysis, SnippetSubmission};

/// Produces a normalized analysis for a validated snippet
#[async_trait]
pub trait CodeReviewer: Send + Sync {
    async fn review(&self, snippet: &SnippetSubmission) -> Result<CodeAnalysis, LLMError>;
}

#[async_trait]
impl CodeReviewer for LLMClient {
    async fn review(&self, snippet: &SnippetSubmission) -> Result<CodeAnalysis, LLMError> {
        self.analyze_snippet(snippet).await
    }
}
