//! Console output formatter for transcripts

use colored::Colorize;
use relay_domain::{Role, SessionKey, Transcript};

/// Formats stored conversations for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a transcript as labelled, indented turns
    pub fn format_history(key: &SessionKey, transcript: &Transcript) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("History: {}", key)));
        output.push('\n');

        if transcript.is_empty() {
            output.push_str(&format!("\n{}\n", "(no messages yet)".dimmed()));
        }

        for turn in transcript {
            output.push_str(&format!(
                "\n{}\n{}\n",
                Self::role_label(turn.role),
                Self::indent(&turn.content, "  ")
            ));
        }

        output.push_str(&Self::footer(transcript.len()));
        output
    }

    /// Format as JSON (`[{"role": ..., "content": ...}, ...]`)
    pub fn format_history_json(transcript: &Transcript) -> String {
        serde_json::to_string_pretty(transcript).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn role_label(role: Role) -> String {
        match role {
            Role::User => "── you ──".cyan().bold().to_string(),
            Role::Assistant => "── assistant ──".yellow().bold().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer(turns: usize) -> String {
        format!("\n{}\n", format!("{} turn(s)", turns).dimmed())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
