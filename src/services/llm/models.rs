//! LLM Data Models
//!
//! Error type and the raw provider reply with its normalization into
//! [`CodeAnalysis`].

use serde::Deserialize;
use serde_json::Value;

use crate::models::{CodeAnalysis, DEFAULT_COMPLEXITY, NO_SUGGESTIONS_PLACEHOLDER};

// ============================================================================
// Raw Provider Reply
// ============================================================================

/// Analysis object as decoded from the provider's reply text.
///
/// The response schema is a request, not a guarantee: every field is optional
/// and kept as raw JSON until [`RawAnalysisReply::normalize`] runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisReply {
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub bugs: Option<Value>,
    #[serde(default)]
    pub vulnerabilities: Option<Value>,
    #[serde(default)]
    pub time_complexity: Option<Value>,
    #[serde(default)]
    pub space_complexity: Option<Value>,
    #[serde(default)]
    pub suggestions: Option<Value>,
}

impl RawAnalysisReply {
    /// Decode the provider's reply text.
    ///
    /// Anything other than a JSON object (including `null`) is rejected.
    pub fn parse(text: &str) -> Result<Self, LLMError> {
        let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
            LLMError::ParseError(format!("Failed to parse LLM response: {}. Content: {}", e, text))
        })?;

        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            Value::Null => Err(LLMError::EmptyResponse),
            other => Err(LLMError::ParseError(format!(
                "Expected a JSON object, got: {}",
                other
            ))),
        }
    }

    /// Apply the defaulting rules and produce a complete analysis
    pub fn normalize(self) -> CodeAnalysis {
        let suggestions = string_list(self.suggestions);

        CodeAnalysis {
            summary: match self.summary {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            bugs: string_list(self.bugs),
            vulnerabilities: string_list(self.vulnerabilities),
            time_complexity: complexity(self.time_complexity),
            space_complexity: complexity(self.space_complexity),
            suggestions: if suggestions.is_empty() {
                vec![NO_SUGGESTIONS_PLACEHOLDER.to_string()]
            } else {
                suggestions
            },
        }
    }
}

/// A list value keeps its string items; any other value becomes an empty list
fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn complexity(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => DEFAULT_COMPLEXITY.to_string(),
    }
}

// ============================================================================
// LLM Error Types
// ============================================================================

/// Fallback message when the provider gives no usable error text
pub const GENERIC_ANALYSIS_FAILURE: &str = "Failed to get analysis from LLM";

/// LLM service errors
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM API key not configured (set GEMINI_API_KEY or APP_LLM_API_KEY)")]
    MissingApiKey,

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("LLM response parsing error: {0}")]
    ParseError(String),

    #[error("Failed to get a valid response from LLM")]
    EmptyResponse,

    #[error("LLM timeout after {0}s")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LLMError {
    /// Configuration problems, as opposed to provider or transport failures
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }

    /// Client-facing detail: the provider or transport message as given,
    /// without the prefix used in logs
    pub fn detail(&self) -> String {
        match self {
            Self::ApiError(msg) | Self::ParseError(msg) if !msg.trim().is_empty() => msg.clone(),
            Self::ApiError(_) | Self::ParseError(_) => GENERIC_ANALYSIS_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}
