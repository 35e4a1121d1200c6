//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_gateway;
pub mod chat_observer;
pub mod conversation_logger;
pub mod local_mirror;
pub mod session_api;
pub mod speech;
