//! Chat command handler.
//!
//! Interactive question/answer loop over the indexed documents.

use clap::Args;
use ragline_core::{AppConfig, AppResult};
use ragline_llm::create_client;
use ragline_pipeline::embed::create_provider;
use ragline_pipeline::index::{open_index, StatsProvider};
use ragline_pipeline::{answer, HistoryStore, Retriever, SourceRef};
use std::io::{BufRead, Write};

/// Maximum characters of a chunk shown as a source snippet.
const SNIPPET_LEN: usize = 80;

/// Interactive chat over the indexed documents
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Show sources after each answer
    #[arg(long)]
    pub sources: bool,
}

/// An interpreted line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Exit,
    History,
    SourcesOn,
    SourcesOff,
    Stats,
    Help,
    Question(String),
}

/// Interpret a line of input. Commands are matched case-insensitively;
/// anything else is a question.
pub fn parse_input(line: &str) -> Option<ChatInput> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    let input = match lowered.as_str() {
        "exit" | "quit" | "bye" => ChatInput::Exit,
        "history" => ChatInput::History,
        "sources on" => ChatInput::SourcesOn,
        "sources off" => ChatInput::SourcesOff,
        "stats" => ChatInput::Stats,
        "help" => ChatInput::Help,
        _ => ChatInput::Question(trimmed.to_string()),
    };
    Some(input)
}

fn print_help() {
    println!("Commands:");
    println!("  exit | quit | bye   Leave the chat");
    println!("  history             Show this session's questions and answers");
    println!("  sources on|off      Toggle source display after answers");
    println!("  stats               Show index statistics");
    println!("  help                Show this message");
    println!("Anything else is treated as a question.");
}

fn snippet(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_LEN).collect();
    if text.chars().count() > SNIPPET_LEN {
        out.push_str("...");
    }
    out
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive chat");

        let embed_key = super::embedding_api_key(config)?;
        let embedder = create_provider(&config.embedding, embed_key.as_deref())?;
        let index = open_index(config).await?;

        let chat_key = super::chat_api_key(config)?;
        let client = create_client(
            &config.chat.provider,
            config.chat.endpoint.as_deref(),
            chat_key.as_deref(),
        )?;

        let retriever = Retriever::new(embedder.as_ref(), index.as_ref(), config.top_k);
        let mut history = HistoryStore::new();
        let mut show_sources = self.sources;

        println!(
            "Chatting over the index ({} / {}). Type 'help' for commands.",
            config.chat.provider, config.chat.model
        );

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }

            let input = match parse_input(&line) {
                Some(input) => input,
                None => continue,
            };

            match input {
                ChatInput::Exit => break,
                ChatInput::Help => print_help(),
                ChatInput::SourcesOn => {
                    show_sources = true;
                    println!("Source display enabled.");
                }
                ChatInput::SourcesOff => {
                    show_sources = false;
                    println!("Source display disabled.");
                }
                ChatInput::History => {
                    if history.is_empty() {
                        println!("No questions asked yet.");
                    }
                    for (i, entry) in history.entries().iter().enumerate() {
                        println!("{}. Q: {}", i + 1, entry.question);
                        println!("   A: {}", entry.answer);
                    }
                }
                ChatInput::Stats => match index.stats().await {
                    Ok(report) => {
                        println!(
                            "Index: {} records, dimension {}, namespace '{}'",
                            report.record_count, report.dimension, report.namespace
                        );
                    }
                    Err(e) => eprintln!("Error fetching stats: {}", e),
                },
                ChatInput::Question(question) => {
                    let chunks = match retriever.retrieve(&question).await {
                        Ok(chunks) => chunks,
                        Err(e) => {
                            eprintln!("Error retrieving context: {}", e);
                            continue;
                        }
                    };

                    let reply =
                        match answer::generate(client.as_ref(), &config.chat, &question, &chunks)
                            .await
                        {
                            Ok(reply) => reply,
                            Err(e) => {
                                eprintln!("Error generating answer: {}", e);
                                continue;
                            }
                        };

                    println!("{}", reply);

                    if show_sources && !chunks.is_empty() {
                        println!("Sources:");
                        for chunk in &chunks {
                            println!("  [{:.3}] {}: {}", chunk.score, chunk.source, snippet(&chunk.text));
                        }
                    }

                    let sources: Vec<SourceRef> = chunks
                        .iter()
                        .map(|c| SourceRef {
                            source: c.source.clone(),
                            snippet: snippet(&c.text),
                            score: c.score,
                        })
                        .collect();
                    history.append(question, reply, sources);
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_case_insensitive() {
        assert_eq!(parse_input("EXIT"), Some(ChatInput::Exit));
        assert_eq!(parse_input("Quit"), Some(ChatInput::Exit));
        assert_eq!(parse_input("bye"), Some(ChatInput::Exit));
        assert_eq!(parse_input("HISTORY"), Some(ChatInput::History));
        assert_eq!(parse_input("Sources On"), Some(ChatInput::SourcesOn));
        assert_eq!(parse_input("sources OFF"), Some(ChatInput::SourcesOff));
        assert_eq!(parse_input("Stats"), Some(ChatInput::Stats));
        assert_eq!(parse_input("HELP"), Some(ChatInput::Help));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parse_input("  exit  "), Some(ChatInput::Exit));
        assert_eq!(parse_input("   "), None);
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn test_anything_else_is_a_question() {
        assert_eq!(
            parse_input("What is an apple?"),
            Some(ChatInput::Question("What is an apple?".to_string()))
        );
        // The question keeps its original casing
        assert_eq!(
            parse_input("Tell me about EXIT codes"),
            Some(ChatInput::Question("Tell me about EXIT codes".to_string()))
        );
    }

    #[test]
    fn test_snippet_truncates_long_text() {
        let long = "x".repeat(200);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), SNIPPET_LEN + 3);

        assert_eq!(snippet("short"), "short");
    }
}
