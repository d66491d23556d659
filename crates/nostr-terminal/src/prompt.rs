//! Line input from the terminal.

use anyhow::{Result, anyhow};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin, stdin};

/// Reads answers one line at a time from stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Print `question` and wait for a line. Closing stdin ends the session.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        print!("{question}");
        std::io::stdout().flush()?;
        self.lines
            .next_line()
            .await?
            .ok_or_else(|| anyhow!("input closed"))
    }

    /// Wait for Enter.
    pub async fn pause(&mut self) -> Result<()> {
        self.ask("Press [Enter] to continue").await.map(|_| ())
    }
}

/// The menu key of an answer: its first character, lowercased. `None` for a bare Enter.
pub fn choice(answer: &str) -> Option<char> {
    answer
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_uses_first_character() {
        assert_eq!(choice("View"), Some('v'));
        assert_eq!(choice("  quote it"), Some('q'));
        assert_eq!(choice("X"), Some('x'));
        assert_eq!(choice(""), None);
        assert_eq!(choice("   "), None);
    }
}
