//! LLM Service Module
//!
//! Turns a validated snippet into a structured [`CodeAnalysis`] by calling
//! the configured provider.
//!
//! # Architecture
//! ```text
//! ┌──────────────┐
//! │ CodeReviewer │  ← Trait (what the analysis service depends on)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐     ┌───────────┐     ┌────────────────────┐
//! │  LLMClient   │ ──▶ │  prompt   │     │ RawAnalysisReply   │
//! │ (Gemini API) │     │ + schema  │     │   .normalize()     │
//! └──────────────┘     └───────────┘     └────────────────────┘
//! ```
//!
//! [`CodeAnalysis`]: crate::models::CodeAnalysis

mod client;
mod models;
mod prompt;
mod reviewer;

pub use client::LLMClient;
pub use models::*;
pub use reviewer::CodeReviewer;
