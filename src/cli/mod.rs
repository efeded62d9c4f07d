//! CLI command definitions and handlers

mod analyze;
mod chat;
mod config;
mod doctor;
mod generate;
mod history;
mod search;
mod tools;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::{
    AiClient, AiConfig, AiError, EmbeddingBackend, LlmBackend, OpenAiCompatibleEmbedder,
};
use crate::config::UserConfig;
use crate::store::{default_db_path, AnalysisStore};

/// eudalens - EUDA spreadsheet inspection
///
/// Scores Excel workbooks for migration complexity and difficulty, pulls out
/// their data sources and suggests a data model and Python replacements.
#[derive(Parser, Debug)]
#[command(name = "eudalens")]
#[command(
    version,
    about = "Inspect end-user spreadsheets: complexity, migration difficulty, data sources and Python translations",
    long_about = "eudalens inspects Excel workbooks (xlsx, xlsm, xlsb, xls) or JSON \
workbook snapshots, scores how complex they are and how hard they will be to \
migrate, extracts the data sources their macros and connections reach, and \
recommends a relational data model.\n\n\
AI features (summaries, code generation, chat, search) are optional and use \
Anthropic, OpenAI, OpenRouter or a local Ollama server.",
    after_help = "\
Examples:
  eudalens analyze Commission.xlsm              Analyze a workbook and store the result
  eudalens analyze book.xlsx --no-ai -f json    Heuristics only, JSON output
  eudalens list                                 Stored analyses, newest first
  eudalens generate 3 -o commission.py          Python replacement for analysis #3
  eudalens classify '=VLOOKUP(A1,B:C,2,FALSE)'  Annotate a single formula"
)]
pub struct Cli {
    /// Path to the analysis database (default: <data dir>/eudalens/eudalens.redb)
    #[arg(long, global = true, env = "EUDALENS_DB")]
    pub db: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a workbook or snapshot and store the result
    #[command(after_help = "\
Examples:
  eudalens analyze Commission.xlsm                      Full analysis with AI summary
  eudalens analyze snapshot.json --no-ai                Heuristics only
  eudalens analyze book.xlsx -f markdown -o report.md   Markdown report for a ticket
  eudalens analyze book.xlsx --no-store                 Don't save to the database")]
    Analyze {
        /// Workbook (.xlsx, .xlsm, .xlsb, .xls, .xla, .xlam) or snapshot (.json)
        file: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Skip the AI summary and embedding
        #[arg(long)]
        no_ai: bool,

        /// Don't save the analysis to the database
        #[arg(long)]
        no_store: bool,
    },

    /// List stored analyses, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a stored analysis
    Show {
        /// Analysis ID (from `eudalens list`)
        id: u64,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,
    },

    /// Generate (or regenerate) the AI summary of a stored analysis
    Summarize {
        /// Analysis ID
        id: u64,
    },

    /// Generate replacement Python code for a stored analysis
    #[command(after_help = "\
Examples:
  eudalens generate 3                    Print the generated code
  eudalens generate 3 -o commission.py   Export to a file")]
    Generate {
        /// Analysis ID
        id: u64,

        /// Write the code to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Ask questions about a stored analysis
    #[command(after_help = "\
Examples:
  eudalens chat 3 \"Which sheets feed the Summary tab?\"   One-shot question
  eudalens chat 3                                        Interactive session (exit or Ctrl-D to leave)")]
    Chat {
        /// Analysis ID
        id: u64,

        /// Question to ask; omit for an interactive session
        message: Option<String>,
    },

    /// Find stored analyses similar to a query
    Search {
        /// Free-text query
        query: String,

        /// Maximum results
        #[arg(long, short = 'n', default_value = "5")]
        limit: usize,
    },

    /// Classify a single formula and print its pandas annotation
    Classify {
        /// Formula text, e.g. '=SUM(A1:A10)'
        formula: String,
    },

    /// Extract data sources from a VBA source file
    Sources {
        /// Text file with macro source
        file: PathBuf,
    },

    /// Delete a stored analysis
    Delete {
        /// Analysis ID
        id: u64,
    },

    /// Interactive browser for stored analyses
    Browse,

    /// Manage the user configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check environment: config, AI keys, Ollama, database
    Doctor,

    /// Show version info
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create the config file with commented defaults
    Init,
    /// Print the effective configuration (keys masked)
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = UserConfig::load()?;
    let db = cli.db;

    match cli.command {
        Commands::Analyze {
            file,
            format,
            output,
            no_ai,
            no_store,
        } => analyze::run(
            &config,
            db.as_deref(),
            &file,
            &format,
            output.as_deref(),
            no_ai,
            no_store,
        ),

        Commands::List { json } => history::list(&open_store(&config, db.as_deref())?, json),

        Commands::Show { id, format } => {
            history::show(&open_store(&config, db.as_deref())?, id, &format)
        }

        Commands::Summarize { id } => {
            history::summarize(&config, &open_store(&config, db.as_deref())?, id)
        }

        Commands::Generate { id, output } => generate::run(
            &config,
            &open_store(&config, db.as_deref())?,
            id,
            output.as_deref(),
        ),

        Commands::Chat { id, message } => chat::run(
            &config,
            &open_store(&config, db.as_deref())?,
            id,
            message.as_deref(),
        ),

        Commands::Search { query, limit } => {
            search::run(&config, &open_store(&config, db.as_deref())?, &query, limit)
        }

        Commands::Classify { formula } => tools::classify(&formula),

        Commands::Sources { file } => tools::sources(&file),

        Commands::Delete { id } => history::delete(&open_store(&config, db.as_deref())?, id),

        Commands::Browse => {
            let store = open_store(&config, db.as_deref())?;
            tui::run(store.list()?)
        }

        Commands::Config { action } => match action {
            ConfigAction::Init => config::init(),
            ConfigAction::Show => config::show(&config, db.as_deref()),
        },

        Commands::Doctor => doctor::run(&config, db.as_deref()),

        Commands::Version => {
            println!("eudalens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Database path precedence: `--db` / `EUDALENS_DB`, then config, then default
fn resolve_db_path(config: &UserConfig, db: Option<&Path>) -> Result<PathBuf> {
    db.map(Path::to_path_buf)
        .or_else(|| config.storage_path().map(Path::to_path_buf))
        .or_else(default_db_path)
        .context("Could not determine a database location; pass --db")
}

fn open_store(config: &UserConfig, db: Option<&Path>) -> Result<AnalysisStore> {
    let path = resolve_db_path(config, db)?;
    AnalysisStore::open(&path)
}

/// Pick an LLM client: the configured backend, or when none is configured the
/// first provider with a key, then a local Ollama server.
fn ai_client(config: &UserConfig) -> Result<AiClient> {
    let ai_config = config.ai_config()?;
    let backend = ai_config.backend;

    if !backend.requires_api_key() {
        return Ok(AiClient::from_env_with_config(ai_config)?);
    }
    if let Some(key) = config.api_key_for(backend) {
        return Ok(AiClient::new(ai_config, key));
    }

    let missing = AiError::MissingApiKey {
        env_var: backend.env_key().to_string(),
        signup_url: backend.signup_url().to_string(),
    };
    if config.ai.backend.is_some() {
        return Err(missing.into());
    }

    LlmBackend::ALL
        .iter()
        .filter(|b| b.requires_api_key())
        .find_map(|&b| {
            config.api_key_for(b).map(|key| {
                let fallback = AiConfig {
                    backend: b,
                    ..Default::default()
                };
                AiClient::new(fallback, key)
            })
        })
        .or_else(|| {
            if AiClient::ollama_available() {
                AiClient::from_env(LlmBackend::Ollama).ok()
            } else {
                None
            }
        })
        .ok_or_else(|| missing.into())
}

fn embedder(config: &UserConfig) -> Result<OpenAiCompatibleEmbedder> {
    let embedding_config = config.embedding_config()?;
    let api_key = match embedding_config.backend {
        EmbeddingBackend::OpenAi => Some(
            config
                .embedding_api_key()
                .map(str::to_string)
                .ok_or_else(|| AiError::MissingApiKey {
                    env_var: "OPENAI_API_KEY".to_string(),
                    signup_url: "https://platform.openai.com/api-keys".to_string(),
                })?,
        ),
        EmbeddingBackend::Ollama => None,
    };
    Ok(OpenAiCompatibleEmbedder::new(embedding_config, api_key))
}

/// Create spinner progress style
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap()
}

/// Run `work` on a background thread while a spinner ticks on stderr
fn with_spinner<T, F>(message: impl Into<String>, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let handle = std::thread::spawn(work);
    let result = handle.join();
    spinner.finish_and_clear();

    result.map_err(|_| anyhow::anyhow!("Background worker panicked"))
}
