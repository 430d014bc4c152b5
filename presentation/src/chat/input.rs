//! Classification of lines typed into the chat.

use relay_domain::STOP_SENTINELS;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Text for the assistant
    Message(String),
    Stop,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        if STOP_SENTINELS.contains(&line) {
            return ReplInput::Stop;
        }
        if !line.starts_with('/') {
            return ReplInput::Message(line.to_string());
        }
        match line {
            "/stop" | "/s" => ReplInput::Stop,
            "/history" => ReplInput::History,
            "/help" | "/h" | "/?" => ReplInput::Help,
            "/quit" | "/exit" | "/q" => ReplInput::Quit,
            other => ReplInput::Unknown(other.to_string()),
        }
    }
}
