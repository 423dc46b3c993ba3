//! Interactive prompt

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use toolchat_core::orchestrator::{Orchestrator, TurnReporter};
use toolchat_core::types::{ToolCall, ToolResult};

const PROMPT: &str = "\nQuery: ";
const MAX_ECHO: usize = 400;

/// What one input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Skip,
    Query(String),
}

pub fn classify(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Skip;
    }
    match line.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Query(line.to_string()),
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_ECHO {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_ECHO).collect();
    format!("{}…", head)
}

/// Prints turn progress as it happens
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl TurnReporter for ConsoleReporter {
    fn assistant_text(&self, text: &str) {
        println!("\n{}", text);
    }

    fn tool_call(&self, call: &ToolCall) {
        println!(
            "{} {} {}",
            "[tool]".cyan().bold(),
            call.name.bold(),
            shorten(&call.input.to_string()).dimmed()
        );
    }

    fn tool_result(&self, result: &ToolResult) {
        if result.content.is_empty() {
            println!("{} {}", "  ↳".dimmed(), "(no results)".dimmed());
        } else if result.is_error {
            println!("{} {}", "  ↳".dimmed(), shorten(&result.content).red());
        } else {
            println!("{} {}", "  ↳".dimmed(), shorten(&result.content).dimmed());
        }
    }
}

pub struct Shell {
    orchestrator: Orchestrator,
    provider: String,
    model: String,
}

impl Shell {
    pub fn new(orchestrator: Orchestrator, provider: impl Into<String>) -> Self {
        let model = orchestrator.options().model.clone();
        Self {
            orchestrator,
            provider: provider.into(),
            model,
        }
    }

    /// Hand the orchestrator back, e.g. to release the tool host
    pub fn into_orchestrator(self) -> Orchestrator {
        self.orchestrator
    }

    /// Read queries until quit, end of input or Ctrl-C
    pub async fn run(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        self.print_welcome().await;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => match classify(&line) {
                    Command::Skip => continue,
                    Command::Quit => break,
                    Command::Query(query) => {
                        let _ = rl.add_history_entry(query.as_str());
                        self.process(&query).await;
                    }
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{} {}", "Input error:".red().bold(), err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn process(&mut self, query: &str) {
        match self.orchestrator.process_query(query).await {
            Ok(outcome) => {
                if outcome.text.is_empty() {
                    println!("{}", "(no response)".dimmed());
                }
            }
            Err(e) => {
                let label = match e.kind() {
                    Some(kind) => format!("{}:", kind),
                    None => "Error:".to_string(),
                };
                eprintln!("\n{} {}", label.red().bold(), e);
            }
        }
    }

    async fn print_welcome(&self) {
        println!();
        println!("{}", "MCP Client Started!".bold());
        println!("Backend: {} ({})", self.provider.cyan(), self.model);
        match self.orchestrator.registry().fetch_catalog().await {
            Ok(tools) => println!(
                "Tools: {}",
                tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
            ),
            Err(e) => println!("{} {}", "Tools unavailable:".yellow(), e),
        }
        println!("Type your queries or 'quit' to exit.");
    }
}
