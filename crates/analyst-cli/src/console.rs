//! Console output and the interactive question loop

use analyst_client::{AskOutcome, Formatter, ProgressSink, ProgressView, QueryChannel};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Prints progress views to stdout and alerts to stderr
pub struct ConsoleSink<'a> {
    formatter: &'a dyn Formatter,
}

impl<'a> ConsoleSink<'a> {
    pub fn new(formatter: &'a dyn Formatter) -> Self {
        Self { formatter }
    }
}

impl ProgressSink for ConsoleSink<'_> {
    fn show_progress(&mut self, view: &ProgressView) {
        println!("{}\n", self.formatter.format_progress(view));
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", self.formatter.format_error(message));
    }
}

/// Ready-made follow-up questions offered by `/suggest`
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "What are the biggest risks for this company?",
    "How does it compare with its peers?",
    "What is driving the sentiment score?",
    "Do the fundamentals support the signal?",
];

/// One line of chat input
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Skip,
    Exit,
    Suggest,
    Ask(&'a str),
    Unknown(&'a str),
}

fn parse_input(input: &str) -> ChatInput<'_> {
    let input = input.trim();
    if input.is_empty() {
        return ChatInput::Skip;
    }
    let Some(command) = input.strip_prefix('/') else {
        return ChatInput::Ask(input);
    };

    match command {
        "exit" | "quit" => ChatInput::Exit,
        "suggest" => ChatInput::Suggest,
        number => number
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| SUGGESTED_QUESTIONS.get(index).copied())
            .map_or(ChatInput::Unknown(input), ChatInput::Ask),
    }
}

fn print_suggestions() {
    println!("Suggested questions:");
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        println!("  /{} {question}", i + 1);
    }
    println!();
}

/// Ask one question and print the reply
pub async fn ask_once(channel: &mut QueryChannel, formatter: &dyn Formatter, question: &str) {
    if channel.ask(question).await == AskOutcome::Ignored {
        eprintln!("{}", formatter.format_error("Question is empty"));
        return;
    }
    if let Some(entry) = channel.transcript().last() {
        println!("{}\n", formatter.format_entry(entry));
    }
}

/// Read questions from stdin until EOF or `/exit`
pub async fn chat(channel: &mut QueryChannel, formatter: &dyn Formatter) -> anyhow::Result<()> {
    println!(
        "Ask anything about job {}. Type /suggest for ideas or /exit to leave.\n",
        channel.job_id()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        match parse_input(&input) {
            ChatInput::Skip => {}
            ChatInput::Exit => {
                println!("Goodbye!");
                break;
            }
            ChatInput::Suggest => print_suggestions(),
            ChatInput::Ask(question) => ask_once(channel, formatter, question).await,
            ChatInput::Unknown(command) => {
                eprintln!(
                    "{}",
                    formatter.format_error(&format!("Unknown command: {command}"))
                );
            }
        }
    }

    debug!(entries = channel.transcript().len(), "Chat finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  \n"), ChatInput::Skip);
        assert_eq!(parse_input("/quit\n"), ChatInput::Exit);
        assert_eq!(parse_input("/suggest"), ChatInput::Suggest);
        assert_eq!(
            parse_input(" Why did margins fall? "),
            ChatInput::Ask("Why did margins fall?")
        );
        assert_eq!(parse_input("/2"), ChatInput::Ask(SUGGESTED_QUESTIONS[1]));
        assert_eq!(parse_input("/0"), ChatInput::Unknown("/0"));
        assert_eq!(parse_input("/9"), ChatInput::Unknown("/9"));
        assert_eq!(parse_input("/help"), ChatInput::Unknown("/help"));
    }
}
