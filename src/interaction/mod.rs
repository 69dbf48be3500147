//! Event handling and user interactions for query-bot.
//!
//! This module provides functionality for handling chat events:
//! - Processing incoming user messages
//! - Coordinating replies between services (remote chat, offline responder, history)

pub mod chat_event;
