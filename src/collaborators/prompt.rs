// src/collaborators/prompt.rs
use std::io::{self, Write};

use crate::domain::error::DomainResult;
use crate::domain::ports::collaborators::Prompt;

/// Reads a `y/n` answer from stdin, same `print; read_line` shape the
/// interactive bookmark processor uses for its own prompts.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str, default: bool) -> DomainResult<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{question} {hint} ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_lowercase();

        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }
}
