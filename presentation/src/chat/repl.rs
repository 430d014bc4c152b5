//! REPL (Read-Eval-Print Loop) for interactive chat
//!
//! The REPL is a client of the relay like any other transport: typed lines
//! go to the [`RelayHandle`], and whatever the relay emits is printed as it
//! arrives. New messages are refused while a reply is streaming, matching
//! the one-generation-at-a-time rule of the relay.

use super::input::ReplInput;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use relay_application::{ChannelOutbound, RelayError, RelayHandle, SessionHub};
use relay_domain::{SessionKey, TURN_ENDED};
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ReplError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Interactive chat REPL
pub struct ChatRepl {
    hub: Arc<SessionHub>,
    key: SessionKey,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(hub: Arc<SessionHub>, key: SessionKey) -> Self {
        Self {
            hub,
            key,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL until `/quit`, end of input, or the session
    /// ends.
    pub async fn run(&self) -> Result<(), ReplError> {
        let (outbound, mut replies) = ChannelOutbound::pair();
        let handle = self.hub.attach(self.key.clone(), Arc::new(outbound)).await?;
        let mut lines = spawn_stdin_reader();
        let mut streaming = false;

        self.print_welcome();
        self.prompt()?;

        loop {
            tokio::select! {
                reply = replies.recv() => match reply {
                    Some(text) if text == TURN_ENDED => {
                        streaming = false;
                        println!();
                        self.prompt()?;
                    }
                    Some(text) => {
                        print!("{}", text);
                        std::io::stdout().flush()?;
                    }
                    None => {
                        warn!(session = %self.key, "Relay closed the session");
                        break;
                    }
                },
                line = lines.recv() => {
                    let Some(line) = line else {
                        println!();
                        break;
                    };
                    if self.handle_line(&line, &handle, &mut streaming).await? {
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    if streaming {
                        println!("{}", " ^C".dimmed());
                        handle.stop()?;
                    } else {
                        println!("^C (type /quit to exit)");
                        self.prompt()?;
                    }
                }
            }
        }

        let summary = handle.close().await?;
        debug!(session = %self.key, ?summary, "Chat ended");
        println!("Bye!");
        Ok(())
    }

    /// Act on one typed line. Returns true if the REPL should exit.
    async fn handle_line(
        &self,
        line: &str,
        handle: &RelayHandle,
        streaming: &mut bool,
    ) -> Result<bool, ReplError> {
        match ReplInput::parse(line) {
            ReplInput::Quit => return Ok(true),
            ReplInput::Empty => {
                if !*streaming {
                    self.prompt()?;
                }
            }
            ReplInput::Stop => {
                if *streaming {
                    handle.stop()?;
                } else {
                    println!("Nothing to stop.");
                    self.prompt()?;
                }
            }
            ReplInput::History => {
                match self.hub.history(&self.key).await {
                    Ok(transcript) => {
                        println!("{}", ConsoleFormatter::format_history(&self.key, &transcript))
                    }
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
                if !*streaming {
                    self.prompt()?;
                }
            }
            ReplInput::Help => {
                self.print_help();
                if !*streaming {
                    self.prompt()?;
                }
            }
            ReplInput::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                if !*streaming {
                    self.prompt()?;
                }
            }
            ReplInput::Message(text) => {
                if *streaming {
                    println!(
                        "{}",
                        "(a reply is still streaming; wait for it or /stop)".dimmed()
                    );
                } else {
                    handle.send(text)?;
                    *streaming = true;
                }
            }
        }
        Ok(false)
    }

    fn prompt(&self) -> std::io::Result<()> {
        print!("{}", self.config.styled_prompt());
        std::io::stdout().flush()
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              chat-relay - Chat              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", self.key.as_str().bold());
        self.print_help();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /stop, /s        - Cancel the reply in progress (or Ctrl-C)");
        println!("  /history         - Show this session's conversation");
        println!("  /help, /h, /?    - Show this help");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }
}

/// Forward stdin lines over a channel so they can be raced with replies.
///
/// Uses a plain thread: a blocking stdin read cannot be cancelled, and
/// parking it on the runtime's blocking pool would hold up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
