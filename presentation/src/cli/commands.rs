//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for chat-relay
#[derive(Parser, Debug)]
#[command(name = "chat-relay")]
#[command(author, version, about = "Stream chat replies from a generation backend, one session per user")]
#[command(long_about = r#"
chat-relay keeps one conversation per user, sends it to a streaming
generation backend and prints the reply token by token as it arrives.

While a reply is streaming, type /stop (or press Ctrl-C) to cancel it.
Cancelled and failed replies are never added to the history.

Configuration files are loaded from (in priority order):
1. CHAT_RELAY_* environment variables (e.g. CHAT_RELAY_BACKEND__URL)
2. --config <path>       Explicit config file
3. ./chat-relay.toml     Project-level config
4. ~/.config/chat-relay/config.toml   Global config

Example:
  chat-relay --user alice
  chat-relay history --user alice --json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Session key (defaults to `[repl] user` from the config)
    #[arg(short, long, global = true, value_name = "KEY")]
    pub user: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive chat session (default)
    Chat,
    /// Print the stored conversation of a session
    History {
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// The subcommand to run; `chat` when none was given.
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_chat() {
        let cli = Cli::try_parse_from(["chat-relay"]).unwrap();
        assert_eq!(cli.selected_command(), Command::Chat);
        assert_eq!(cli.user, None);
    }

    #[test]
    fn test_history_with_global_flags() {
        let cli =
            Cli::try_parse_from(["chat-relay", "history", "--user", "alice", "--json", "-vv"])
                .unwrap();
        assert_eq!(cli.selected_command(), Command::History { json: true });
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
