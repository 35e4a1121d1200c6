//! Interactive chat module
//!
//! Provides a readline-based terminal client for chatnest sessions.

mod repl;

pub use repl::{ChatRepl, ReplCommand, SessionRef, VoicesAction, parse_command};
