//! Output formatting for the terminal client

pub mod console;
