//! Analysis Request Validator
//!
//! Runs before any external call; rejection has no side effects.

use crate::config::LimitsConfig;
use crate::models::{AnalyzeSnippetRequest, SnippetSubmission};
use crate::utils::{ApiError, ApiResult};

/// Check that `code`, `language` and `title` are present and non-empty.
///
/// Whitespace-only values count as empty. `language` and `title` are trimmed;
/// `code` is kept verbatim and checked against the size limit.
pub fn validate_request(
    req: AnalyzeSnippetRequest,
    limits: &LimitsConfig,
) -> ApiResult<SnippetSubmission> {
    let code = req.code.filter(|c| !c.trim().is_empty());
    let language = req.language.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let title = req.title.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let (Some(code), Some(language), Some(title)) = (code, language, title) else {
        return Err(ApiError::missing_fields());
    };

    if code.len() > limits.max_code_bytes {
        return Err(ApiError::validation_error(format!(
            "Code snippet exceeds the maximum size of {} bytes",
            limits.max_code_bytes
        )));
    }

    Ok(SnippetSubmission { code, language, title })
}
