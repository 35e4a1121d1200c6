//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for chatnest
#[derive(Parser, Debug)]
#[command(name = "chatnest")]
#[command(author, version, about = "Multi-session chat companion with a small session backend")]
#[command(long_about = r#"
chatnest is a chat client/server pair.

`chatnest serve` runs the session backend: an in-memory session store behind
/api/sessions plus a forwarding proxy for the proxied chat model.
`chatnest chat` is a terminal client that streams replies, keeps several
conversations and syncs them to the backend.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./chatnest.toml     Project-level config
3. ~/.config/chatnest/config.toml   Global config
Environment variables prefixed with CHATNEST_ override all of them
(e.g. CHATNEST_CLIENT__API_BASE_URL).

Example:
  chatnest serve --bind 0.0.0.0:3000
  chatnest chat -m deepseek-chat
  chatnest models
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the session backend and chat proxy
    Serve {
        /// Address to listen on (overrides [server] bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Start the interactive chat client
    Chat {
        /// Model to chat with
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// Session backend base URL (overrides [client] api_base_url)
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },

    /// List the configured models
    Models,
}

impl Cli {
    /// The subcommand to run; a bare invocation starts the chat client.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat {
            model: None,
            server: None,
        })
    }
}
