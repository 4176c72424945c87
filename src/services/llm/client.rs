//! LLM Client - HTTP client for the Gemini `generateContent` API
//!
//! One request per analysis, no retries. The reply text is decoded into a
//! [`RawAnalysisReply`] and normalized before it leaves this module.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::models::*;
use super::prompt;
use crate::config::LLMConfig;
use crate::models::{CodeAnalysis, SnippetSubmission};

/// LLM HTTP Client
pub struct LLMClient {
    http_client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    timeout_secs: Option<u64>,
}

impl LLMClient {
    pub fn new(config: &LLMConfig) -> Result<Self, LLMError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| LLMError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Review a snippet and return the normalized analysis
    pub async fn analyze_snippet(
        &self,
        snippet: &SnippetSubmission,
    ) -> Result<CodeAnalysis, LLMError> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, prompt::system_instruction(&snippet.language))),
            contents: vec![Content::text(Some("user"), prompt::task_prompt(snippet))],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: prompt::response_schema(),
            }),
        };

        let reply = self.generate_content(&request).await?;
        let text = reply.text().ok_or(LLMError::EmptyResponse)?;

        if let Some(usage) = &reply.usage_metadata {
            tracing::debug!(
                "LLM usage - prompt_tokens: {}, output_tokens: {}",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }

        Ok(RawAnalysisReply::parse(&text)?.normalize())
    }

    /// Send a minimal prompt to verify the key and model are usable
    pub async fn test_connection(&self) -> Result<String, LLMError> {
        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text(
                Some("user"),
                "Explain how AI works in a few words".to_string(),
            )],
            generation_config: None,
        };

        let reply = self.generate_content(&request).await?;
        reply.text().ok_or(LLMError::EmptyResponse)
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LLMError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LLMError::MissingApiKey)?;

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        tracing::debug!("Calling LLM API: {} with model {}", url, self.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout(self.timeout_secs.unwrap_or_default())
                } else {
                    LLMError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LLMError::ApiError(e.to_string()))?;

        if !status.is_success() {
            let message = provider_error_message(&body)
                .unwrap_or_else(|| format!("{} (status {})", GENERIC_ANALYSIS_FAILURE, status));
            return Err(LLMError::ApiError(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| LLMError::ParseError(format!("Malformed provider response: {}", e)))
    }
}

/// Extract `error.message` from a provider error body
fn provider_error_message(body: &str) -> Option<String> {
    let parsed: ErrorEnvelope = serde_json::from_str(body).ok()?;
    parsed.error.message.filter(|m| !m.trim().is_empty())
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self { role: role.map(str::to_string), parts: vec![Part { text: Some(text) }] }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
