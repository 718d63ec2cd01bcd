use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Outcome of a validator: `Err` carries the message shown before re-asking
pub type Validation = std::result::Result<(), String>;

pub struct TextQuestion<'a> {
    pub message: &'a str,
    pub default: Option<&'a str>,
    pub validate: &'a dyn Fn(&str) -> Validation,
}

#[derive(Debug, Clone)]
pub struct Choice {
    pub title: String,
    pub description: Option<String>,
}

impl Choice {
    pub fn new(title: impl Into<String>) -> Self {
        Choice {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Interactive questions. `Ok(None)` means the user cancelled.
pub trait Prompter {
    fn text(&mut self, question: &TextQuestion<'_>) -> Result<Option<String>>;

    /// Index of the picked choice
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>>;

    fn confirm(&mut self, message: &str) -> Result<Option<bool>>;
}

/// Line-oriented prompter; end of input (Ctrl-D) cancels
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        TerminalPrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompter { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, message: &str, hint: Option<&str>) -> Result<Option<String>> {
        write!(self.output, "{} {}", "?".green().bold(), message.bold())?;
        if let Some(hint) = hint {
            write!(self.output, " {}", hint.dimmed())?;
        }
        write!(self.output, " ")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from the terminal")?;

        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
        Ok(Some(line))
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{} {}", ">>".red().bold(), message.red())?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn text(&mut self, question: &TextQuestion<'_>) -> Result<Option<String>> {
        let hint = question.default.map(|default| format!("({})", default));

        loop {
            let Some(line) = self.ask(question.message, hint.as_deref())? else {
                return Ok(None);
            };

            let value = match question.default {
                Some(default) if line.trim().is_empty() => default.to_string(),
                _ => line,
            };

            match (question.validate)(&value) {
                Ok(()) => return Ok(Some(value)),
                Err(message) => self.warn(&message)?,
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>> {
        loop {
            writeln!(self.output, "{} {}", "?".green().bold(), message.bold())?;
            for (i, choice) in choices.iter().enumerate() {
                match &choice.description {
                    Some(description) => writeln!(
                        self.output,
                        "  {}) {} {}",
                        i + 1,
                        choice.title,
                        format!("- {}", description).dimmed()
                    )?,
                    None => writeln!(self.output, "  {}) {}", i + 1, choice.title)?,
                }
            }

            let hint = format!("[1-{}]", choices.len());
            let Some(line) = self.ask("Enter a number:", Some(&hint))? else {
                return Ok(None);
            };

            match line.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.warn(&format!("Please enter a number between 1 and {}.", choices.len()))?,
            }
        }
    }

    fn confirm(&mut self, message: &str) -> Result<Option<bool>> {
        loop {
            let Some(line) = self.ask(message, Some("(y/N)"))? else {
                return Ok(None);
            };

            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "" | "n" | "no" => return Ok(Some(false)),
                _ => self.warn("Please answer y or n.")?,
            }
        }
    }
}
