//! Presentation layer for chatnest
//!
//! This crate contains the HTTP session server, CLI definitions,
//! console output and the interactive terminal chat.

pub mod chat;
pub mod cli;
pub mod output;
pub mod server;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command};
pub use output::console::{ConsoleFormatter, ConsolePresenter};
pub use server::{ChatProxy, ServerState, router, serve};
