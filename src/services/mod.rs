pub mod analysis_repository;
pub mod analysis_service;
pub mod llm;
pub mod snippet_validator;

pub use analysis_repository::AnalysisRepository;
pub use analysis_service::AnalysisService;
pub use llm::{CodeReviewer, LLMClient, LLMError};
pub use snippet_validator::validate_request;
