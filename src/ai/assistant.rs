//! Workbook assistant: summaries, code generation and chat over a [`LanguageModel`]

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

use super::prompts::{chat_context, codegen_prompt, summary_prompt, PromptTemplate};
use super::{AiResult, LanguageModel, Message};
use crate::models::{AnalysisReport, StoredAnalysis};

const SUMMARY_MAX_TOKENS: u32 = 1000;
const CODEGEN_MAX_TOKENS: u32 = 4000;
const CHAT_MAX_TOKENS: u32 = 1500;

static PYTHON_BLOCK: OnceLock<Regex> = OnceLock::new();

fn python_block() -> &'static Regex {
    PYTHON_BLOCK.get_or_init(|| Regex::new(r"(?s)```python\n(.*?)```").unwrap())
}

pub struct Assistant<M> {
    model: M,
}

impl<M: LanguageModel> Assistant<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Summarize a workbook and recommend whether to migrate it
    pub fn summarize(&self, report: &AnalysisReport) -> AiResult<String> {
        info!("Requesting summary for {}", report.file_name());
        let prompt = summary_prompt(report);
        self.model.complete(
            vec![Message::user(prompt)],
            Some(PromptTemplate::summary_system()),
            SUMMARY_MAX_TOKENS,
        )
    }

    /// Generate a Python application replacing the workbook.
    ///
    /// Returns the python code blocks of the response, or the whole response
    /// when it contains none.
    pub fn generate_code(&self, analysis: &StoredAnalysis) -> AiResult<String> {
        info!("Requesting replacement code for {}", analysis.file_name);
        let prompt = codegen_prompt(analysis);
        let response = self.model.complete(
            vec![Message::user(prompt)],
            Some(PromptTemplate::codegen_system()),
            CODEGEN_MAX_TOKENS,
        )?;
        Ok(extract_python_blocks(&response))
    }

    /// Answer a question about a stored workbook.
    ///
    /// `history` holds earlier user/assistant turns of the same conversation.
    pub fn chat(
        &self,
        analysis: &StoredAnalysis,
        history: &[Message],
        question: &str,
    ) -> AiResult<String> {
        let system = format!("{}\n\n{}", PromptTemplate::chat_system(), chat_context(analysis));
        let mut messages = history.to_vec();
        messages.push(Message::user(question));
        debug!("Chat turn {} for analysis #{}", messages.len(), analysis.id);
        self.model.complete(messages, Some(&system), CHAT_MAX_TOKENS)
    }
}

/// Join every ```` ```python ```` block with a blank line, or return the text as-is
pub fn extract_python_blocks(response: &str) -> String {
    let blocks: Vec<&str> = python_block()
        .captures_iter(response)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    if blocks.is_empty() {
        response.to_string()
    } else {
        blocks.join("\n\n")
    }
}
