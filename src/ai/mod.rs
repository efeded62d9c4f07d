//! LLM assistance for workbook analysis
//!
//! Summaries, replacement-code generation and chat go through any
//! [`LanguageModel`]; [`AiClient`] implements it for Anthropic and
//! OpenAI-compatible providers. Uses BYOK (bring your own key): API keys are
//! read from the environment or the user config.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Required for the Anthropic backend (default)
//! - `OPENAI_API_KEY`: Required for the OpenAI backend and OpenAI embeddings
//! - `OPENROUTER_API_KEY`: Required for the OpenRouter backend
//! - `OLLAMA_MODEL`: Optional model override for a local Ollama server
//!
//! # Example
//!
//! ```rust,ignore
//! use eudalens::ai::{AiClient, Assistant, LlmBackend};
//!
//! let client = AiClient::from_env(LlmBackend::Anthropic)?;
//! let summary = Assistant::new(client).summarize(&report)?;
//! ```

mod assistant;
mod client;
mod embeddings;
mod prompts;

pub use assistant::{extract_python_blocks, Assistant};
pub use client::{AiClient, AiConfig, LanguageModel, LlmBackend, Message, Role};
pub use embeddings::{
    cosine_similarity, Embedder, EmbeddingBackend, EmbeddingConfig, OpenAiCompatibleEmbedder,
};
pub use prompts::{embedding_text, PromptTemplate};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type AiResult<T> = Result<T, AiError>;
