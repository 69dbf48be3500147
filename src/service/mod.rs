//! Service integrations for query-bot.
//!
//! This module contains the services used by the client:
//! - Remote chat services (e.g., a JSON endpoint over HTTP)
//! - History storage (e.g., a JSON file)
//! - The offline fallback responder
//!
//! The remote and storage services define both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod history;
pub mod responder;
