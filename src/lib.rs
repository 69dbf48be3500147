//! Library root for `query-bot`.
//!
//! Query-bot is a terminal chat client for a computer help assistant designed to:
//! - Send each message to a remote chat endpoint, bounded by a timeout
//! - Answer offline with a heuristic responder when the remote call fails
//! - Persist the thread locally and export it as a plain-text transcript
//!
//! The offline responder matches against a small, ordered knowledge table using
//! substring triggers, Levenshtein similarity, and a few pattern rules. The remote
//! client and the history store sit behind traits so that other implementations
//! can be swapped in.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the query-bot runtime:
/// - Creates the runtime context with chat client, history store, and responder
/// - Starts the interactive loop for processing messages
pub async fn start(config: Config, offline: bool) -> Void {
    info!("Starting query-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config, offline)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
