//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod assembler;
pub mod chat_controller;
pub mod dispatcher;
pub mod session_service;
pub mod speech_player;
pub mod sync_scheduler;
