//! Text embeddings for similarity search over stored analyses

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use super::client::make_agent;
use super::{AiError, AiResult};

/// Embedding providers speaking the OpenAI `/embeddings` protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl EmbeddingBackend {
    pub fn default_model(&self) -> &'static str {
        match self {
            EmbeddingBackend::OpenAi => "text-embedding-3-small",
            EmbeddingBackend::Ollama => "nomic-embed-text",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            EmbeddingBackend::OpenAi => "https://api.openai.com/v1/embeddings",
            EmbeddingBackend::Ollama => "http://localhost:11434/v1/embeddings",
        }
    }

    pub fn env_key(&self) -> Option<&'static str> {
        match self {
            EmbeddingBackend::OpenAi => Some("OPENAI_API_KEY"),
            EmbeddingBackend::Ollama => None,
        }
    }
}

impl FromStr for EmbeddingBackend {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingBackend::OpenAi),
            "ollama" => Ok(EmbeddingBackend::Ollama),
            other => Err(AiError::ConfigError(format!(
                "Unknown embedding backend '{}'. Valid: openai, ollama",
                other
            ))),
        }
    }
}

/// Turns text into a fixed-length vector
pub trait Embedder {
    fn embed(&self, text: &str) -> AiResult<Vec<f32>>;
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub model: Option<String>,
    pub api_url: Option<String>,
}

impl EmbeddingConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.backend.api_url())
    }
}

pub struct OpenAiCompatibleEmbedder {
    config: EmbeddingConfig,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl OpenAiCompatibleEmbedder {
    pub fn new(config: EmbeddingConfig, api_key: Option<String>) -> Self {
        Self {
            config,
            api_key,
            agent: make_agent(),
        }
    }

    pub fn from_env(config: EmbeddingConfig) -> AiResult<Self> {
        let api_key = match config.backend.env_key() {
            Some(key) => Some(env::var(key).map_err(|_| AiError::MissingApiKey {
                env_var: key.to_string(),
                signup_url: "https://platform.openai.com/api-keys".to_string(),
            })?),
            None => None,
        };
        Ok(Self::new(config, api_key))
    }
}

impl Embedder for OpenAiCompatibleEmbedder {
    fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        let body = EmbeddingRequest {
            model: self.config.model(),
            input: text,
        };

        let mut req = self
            .agent
            .post(self.config.api_url())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", &format!("Bearer {}", key));
        }

        let response = req.send_json(&body).map_err(|e| AiError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: EmbeddingResponse = response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        resp.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AiError::ParseError("No embedding in response".to_string()))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// Cosine similarity; zero vectors and length mismatches score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product(a, b) / (norm_a * norm_b)
}
