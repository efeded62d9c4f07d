//! Config command - create or print the user configuration

use anyhow::Result;
use console::style;
use std::path::Path;

use super::resolve_db_path;
use crate::config::UserConfig;

pub fn init() -> Result<()> {
    let existed = UserConfig::user_config_path().is_some_and(|p| p.exists());
    let path = UserConfig::init_user_config()?;

    if existed {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    } else {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        println!("  Uncomment the settings you need; environment variables still take priority.");
    }
    Ok(())
}

pub fn show(config: &UserConfig, db: Option<&Path>) -> Result<()> {
    let config_path = UserConfig::user_config_path();
    println!(
        "{} {}",
        style("Config file:").bold(),
        match &config_path {
            Some(p) if p.exists() => p.display().to_string(),
            Some(p) => format!("{} (not created)", p.display()),
            None => "unavailable".to_string(),
        }
    );

    println!("\n{}", style("[ai]").bold());
    let ai = config.ai_config()?;
    println!("  backend  = {}", ai.backend);
    println!("  model    = {}", ai.model());
    println!("  api_url  = {}", ai.api_url());
    println!("  anthropic_api_key  = {}", mask(config.ai.anthropic_api_key.as_deref()));
    println!("  openai_api_key     = {}", mask(config.ai.openai_api_key.as_deref()));
    println!("  openrouter_api_key = {}", mask(config.ai.openrouter_api_key.as_deref()));

    println!("\n{}", style("[embeddings]").bold());
    let embeddings = config.embedding_config()?;
    println!("  backend  = {:?}", embeddings.backend);
    println!("  model    = {}", embeddings.model());
    println!("  api_url  = {}", embeddings.api_url());

    println!("\n{}", style("[storage]").bold());
    match resolve_db_path(config, db) {
        Ok(path) => println!("  path     = {}", path.display()),
        Err(e) => println!("  path     = {}", style(e).red()),
    }
    Ok(())
}

/// Show only the last four characters of a secret
fn mask(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(k) if k.chars().count() <= 8 => "****".to_string(),
        Some(k) => {
            let tail: String = k.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{}", tail)
        }
    }
}
