//! Configuration for eudalens
//!
//! A single user-level TOML file selects the LLM and embedding backends and
//! the database location. Environment variables override file values.

mod user_config;

pub use user_config::{AiSection, EmbeddingsSection, StorageSection, UserConfig};
