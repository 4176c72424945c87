//! Prompt and response schema for snippet review

use serde_json::{Value, json};

use crate::models::SnippetSubmission;

/// Reviewer persona, parameterized by the snippet's language
pub fn system_instruction(language: &str) -> String {
    format!(
        "You are an expert software engineer and code reviewer. You will be given a code \
         snippet written in {language} and must analyze it. Respond with a structured JSON \
         object containing: 1. a summary of what the code does, 2. bugs in the code (if any), \
         3. security vulnerabilities in the code (if any), 4. the time complexity of the code, \
         5. the space complexity of the code, 6. suggestions to improve the code."
    )
}

/// Task prompt embedding the title and the code in a fenced block
pub fn task_prompt(snippet: &SnippetSubmission) -> String {
    format!(
        "Title: {title}\n\nAnalyze the following code snippet and provide a detailed analysis.\n\n\
         Code Snippet:\n```{language}\n{code}\n```",
        title = snippet.title,
        language = snippet.language,
        code = snippet.code,
    )
}

/// Structured-output schema: six fields, all required
pub fn response_schema() -> Value {
    let string_list = |item: &str, list: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING", "description": item },
            "description": list,
        })
    };

    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A concise summary of what the code does",
            },
            "bugs": string_list(
                "Description of a bug or potential issue in the code",
                "List of bugs or potential issues found in the code",
            ),
            "vulnerabilities": string_list(
                "Description of a security vulnerability in the code",
                "List of security vulnerabilities found in the code",
            ),
            "timeComplexity": {
                "type": "STRING",
                "description": "Big O notation time complexity of the algorithm",
            },
            "spaceComplexity": {
                "type": "STRING",
                "description": "Big O notation space complexity of the algorithm",
            },
            "suggestions": string_list(
                "A specific suggestion to improve the code",
                "List of suggestions to improve the code",
            ),
        },
        "required": [
            "summary",
            "bugs",
            "vulnerabilities",
            "timeComplexity",
            "spaceComplexity",
            "suggestions",
        ],
    })
}
