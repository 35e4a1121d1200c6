//! Chat session domain.
//!
//! - [`entities::Session`]: a persisted conversation thread
//! - [`entities::Message`]: a single message within a session
//! - [`repository::SessionStore`]: trait for session persistence

pub mod entities;
pub mod repository;
