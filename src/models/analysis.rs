use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Placeholder stored when the provider returns no suggestions
pub const NO_SUGGESTIONS_PLACEHOLDER: &str = "No suggestions provided";

/// Complexity stored when the provider omits an estimate
pub const DEFAULT_COMPLEXITY: &str = "O(1)";

/// Structured review of a snippet, fully defaulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnalysis {
    pub summary: String,
    pub bugs: Vec<String>,
    pub vulnerabilities: Vec<String>,
    pub time_complexity: String,
    pub space_complexity: String,
    pub suggestions: Vec<String>,
}

/// A persisted snippet together with its analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnippetAnalysisRecord {
    pub id: String,
    pub code: String,
    pub language: String,
    pub title: String,
    pub analysis: CodeAnalysis,
    pub created_at: DateTime<Utc>,
}

/// Row shape of `snippet_analyses`; the analysis is kept as one JSON document
#[derive(Debug, Clone, FromRow)]
pub struct SnippetAnalysisRow {
    pub id: String,
    pub code: String,
    pub language: String,
    pub title: String,
    pub analysis_json: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SnippetAnalysisRow> for SnippetAnalysisRecord {
    type Error = serde_json::Error;

    fn try_from(row: SnippetAnalysisRow) -> Result<Self, Self::Error> {
        Ok(Self {
            analysis: serde_json::from_str(&row.analysis_json)?,
            id: row.id,
            code: row.code,
            language: row.language,
            title: row.title,
            created_at: row.created_at,
        })
    }
}

/// Body of `POST /api/analyze/snippets`.
///
/// Every field is optional on the wire so that a missing field reaches the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AnalyzeSnippetRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A snippet that passed validation; the only input the reviewer accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetSubmission {
    pub code: String,
    pub language: String,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeSnippetResponse {
    pub message: String,
    pub data: SnippetAnalysisRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SnippetListResponse {
    pub message: String,
    pub data: Vec<SnippetAnalysisRecord>,
}
