//! Chat command - questions about a stored analysis

use anyhow::{Context, Result};
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use super::{ai_client, history, with_spinner};
use crate::ai::{AiClient, Assistant, Message};
use crate::config::UserConfig;
use crate::models::StoredAnalysis;
use crate::store::AnalysisStore;

pub fn run(
    config: &UserConfig,
    store: &AnalysisStore,
    id: u64,
    message: Option<&str>,
) -> Result<()> {
    let analysis = Arc::new(history::load(store, id)?);
    let client = Arc::new(ai_client(config)?);

    if let Some(question) = message {
        let answer = ask(&client, &analysis, Vec::new(), question)?;
        println!("{}", answer);
        return Ok(());
    }

    println!(
        "Chatting about {} with {}. Type {} or press Ctrl-D to leave.\n",
        style(&analysis.file_name).bold(),
        client.model(),
        style("exit").cyan()
    );

    let stdin = io::stdin();
    let mut conversation: Vec<Message> = Vec::new();
    loop {
        print!("{} ", style(">").green().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match ask(&client, &analysis, conversation.clone(), question) {
            Ok(answer) => {
                println!("\n{}\n", answer);
                conversation.push(Message::user(question));
                conversation.push(Message::assistant(answer));
            }
            // Keep the session alive on a failed turn
            Err(e) => eprintln!("{} {:#}\n", style("error:").red(), e),
        }
    }

    Ok(())
}

fn ask(
    client: &Arc<AiClient>,
    analysis: &Arc<StoredAnalysis>,
    conversation: Vec<Message>,
    question: &str,
) -> Result<String> {
    let client = Arc::clone(client);
    let analysis = Arc::clone(analysis);
    let question = question.to_string();

    with_spinner("Thinking...", move || {
        Assistant::new(&*client).chat(&analysis, &conversation, &question)
    })?
    .context("Chat request failed")
}
