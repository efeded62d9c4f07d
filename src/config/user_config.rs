//! User-level configuration for eudalens
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/eudalens/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::ai::{self, EmbeddingBackend, EmbeddingConfig, LlmBackend};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub embeddings: EmbeddingsSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AiSection {
    /// AI backend: "anthropic" (default), "openai", "openrouter", "ollama"
    pub backend: Option<String>,

    /// Model override for the chosen backend
    pub model: Option<String>,

    /// Endpoint override, e.g. a remote Ollama host
    pub api_url: Option<String>,

    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EmbeddingsSection {
    /// Embedding backend: "openai" (default) or "ollama"
    pub backend: Option<String>,
    pub model: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageSection {
    /// Database file; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/eudalens/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            match Self::load_from(&path) {
                Ok(user_config) => config.merge(user_config),
                Err(e) => warn!("Ignoring user config: {:#}", e),
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Parse a single config file without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Environment variables override everything
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            self.ai.openrouter_api_key = Some(key);
        }
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("eudalens").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: UserConfig) {
        fn take<T>(slot: &mut Option<T>, other: Option<T>) {
            if other.is_some() {
                *slot = other;
            }
        }
        take(&mut self.ai.backend, other.ai.backend);
        take(&mut self.ai.model, other.ai.model);
        take(&mut self.ai.api_url, other.ai.api_url);
        take(&mut self.ai.anthropic_api_key, other.ai.anthropic_api_key);
        take(&mut self.ai.openai_api_key, other.ai.openai_api_key);
        take(&mut self.ai.openrouter_api_key, other.ai.openrouter_api_key);
        take(&mut self.embeddings.backend, other.embeddings.backend);
        take(&mut self.embeddings.model, other.embeddings.model);
        take(&mut self.embeddings.api_url, other.embeddings.api_url);
        take(&mut self.storage.path, other.storage.path);
    }

    pub fn ai_backend(&self) -> Result<LlmBackend> {
        match self.ai.backend.as_deref() {
            Some(name) => Ok(name.parse()?),
            None => Ok(LlmBackend::default()),
        }
    }

    /// Configured key for a backend, if any
    pub fn api_key_for(&self, backend: LlmBackend) -> Option<&str> {
        match backend {
            LlmBackend::Anthropic => self.ai.anthropic_api_key.as_deref(),
            LlmBackend::OpenAi => self.ai.openai_api_key.as_deref(),
            LlmBackend::OpenRouter => self.ai.openrouter_api_key.as_deref(),
            LlmBackend::Ollama => None,
        }
    }

    /// Check if the selected backend can be used
    pub fn has_ai_key(&self) -> bool {
        match self.ai_backend() {
            Ok(backend) => !backend.requires_api_key() || self.api_key_for(backend).is_some(),
            Err(_) => false,
        }
    }

    pub fn ai_config(&self) -> Result<ai::AiConfig> {
        Ok(ai::AiConfig {
            backend: self.ai_backend()?,
            model: self.ai.model.clone(),
            api_url: self.ai.api_url.clone(),
            ..Default::default()
        })
    }

    pub fn embedding_config(&self) -> Result<EmbeddingConfig> {
        let backend = match self.embeddings.backend.as_deref() {
            Some(name) => name.parse::<EmbeddingBackend>()?,
            None => EmbeddingBackend::default(),
        };
        Ok(EmbeddingConfig {
            backend,
            model: self.embeddings.model.clone(),
            api_url: self.embeddings.api_url.clone(),
        })
    }

    /// Key for the embedding backend, if it needs one
    pub fn embedding_api_key(&self) -> Option<&str> {
        self.ai.openai_api_key.as_deref()
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage.path.as_deref()
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, EXAMPLE_CONFIG)?;
        }

        Ok(config_path)
    }
}

const EXAMPLE_CONFIG: &str = r#"# eudalens User Configuration

[ai]
# Backend: "anthropic" (default), "openai", "openrouter" or "ollama" (free, local)
# backend = "anthropic"
# model = "claude-sonnet-4-20250514"

# Keys can also come from ANTHROPIC_API_KEY / OPENAI_API_KEY / OPENROUTER_API_KEY
# anthropic_api_key = "sk-ant-..."
# openai_api_key = "sk-..."

# For Ollama on another machine
# api_url = "http://gpu-box:11434/v1/chat/completions"

[embeddings]
# Backend for similarity search: "openai" (default) or "ollama"
# backend = "ollama"
# model = "nomic-embed-text"

[storage]
# path = "/srv/eudalens/eudalens.redb"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.has_ai_key());
        assert_eq!(config.ai_backend().unwrap(), LlmBackend::Anthropic);
        assert!(config.storage_path().is_none());
        assert_eq!(
            config.embedding_config().unwrap().backend,
            EmbeddingBackend::OpenAi
        );
    }

    #[test]
    fn test_toml_parsing_ollama_backend() {
        let toml_str = r#"
[ai]
backend = "ollama"
model = "qwen2.5:14b"

[embeddings]
backend = "ollama"

[storage]
path = "/tmp/e.redb"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ai_backend().unwrap(), LlmBackend::Ollama);
        assert!(config.has_ai_key());
        let ai = config.ai_config().unwrap();
        assert_eq!(ai.model(), "qwen2.5:14b");
        assert_eq!(config.embedding_config().unwrap().model(), "nomic-embed-text");
        assert_eq!(config.storage_path(), Some(Path::new("/tmp/e.redb")));
    }

    #[test]
    fn test_api_key_per_backend() {
        let toml_str = r#"
[ai]
backend = "openai"
anthropic_api_key = "sk-ant-abc"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.has_ai_key());
        assert_eq!(config.api_key_for(LlmBackend::Anthropic), Some("sk-ant-abc"));
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let config: UserConfig = toml::from_str("[ai]\nbackend = \"bedrock\"").unwrap();
        assert!(config.ai_backend().is_err());
        assert!(!config.has_ai_key());
    }

    #[test]
    fn test_load_from_file_and_invalid_toml() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[ai]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(
            UserConfig::load_from(&good).unwrap().ai.model.as_deref(),
            Some("gpt-4o-mini")
        );

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "this is [[ not valid toml {{{}}}").unwrap();
        assert!(UserConfig::load_from(&bad).is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config: UserConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.ai.backend.is_none());
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut base: UserConfig =
            toml::from_str("[ai]\nbackend = \"anthropic\"\nanthropic_api_key = \"sk-old\"").unwrap();
        let other: UserConfig =
            toml::from_str("[ai]\nanthropic_api_key = \"sk-new\"\n[storage]\npath = \"x.redb\"")
                .unwrap();
        base.merge(other);
        assert_eq!(base.api_key_for(LlmBackend::Anthropic), Some("sk-new"));
        assert_eq!(base.ai.backend.as_deref(), Some("anthropic"));
        assert_eq!(base.storage_path(), Some(Path::new("x.redb")));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("eudalens/config.toml"));
        }
    }
}
