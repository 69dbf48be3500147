//! Runtime services and the interactive terminal session for query-bot.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        replies::{CLEARED_MESSAGE, TYPING_INDICATOR, WELCOME_MESSAGE},
        types::{ChatMessage, Res, Void, format_time},
    },
    interaction::chat_event::handle_chat,
    service::{
        chat::ChatClient,
        history::{History, HistoryStore, export_transcript},
        responder::FallbackResponder,
    },
};

/// Default file name for exported transcripts.
pub const DEFAULT_EXPORT_PATH: &str = "chat-history.txt";

const HELP_TEXT: &str = "Commands: /history, /export [path], /delete <id>, /clear, /help, /quit";

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, history store, offline responder, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The remote chat client instance.
    pub chat: ChatClient,
    /// The history store instance.
    pub history: HistoryStore,
    /// The offline responder.
    pub responder: FallbackResponder,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// When `offline` is set, the remote endpoint is ignored and every reply comes from the
    /// offline responder.
    #[instrument(skip_all)]
    pub fn new(config: Config, offline: bool) -> Res<Self> {
        let chat = if offline { ChatClient::offline() } else { ChatClient::http(&config)? };
        let history = HistoryStore::file(&config);
        let responder = FallbackResponder::default();

        Ok(Self { config, chat, history, responder })
    }

    /// Run the interactive session on stdin/stdout until EOF or `/quit`.
    pub async fn start(&self) -> Void {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        self.run(stdin, stdout).await
    }

    /// Run the interactive session over arbitrary input and output streams.
    #[instrument(skip_all)]
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Void
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut history = History::load(self.history.clone(), self.config.history_limit).await;

        for message in history.messages() {
            write_line(&mut output, &render_message(message)).await?;
        }

        if history.is_empty() {
            let welcome = ChatMessage::bot(WELCOME_MESSAGE);
            write_line(&mut output, &render_message(&welcome)).await?;
            history.push(welcome).await;
        }

        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Command::Empty => {}
                Command::Quit => break,
                Command::Help => write_line(&mut output, HELP_TEXT).await?,
                Command::History => {
                    for message in history.messages() {
                        write_line(&mut output, &render_message(message)).await?;
                    }
                }
                Command::Export(path) => match export_transcript(history.messages(), &path).await {
                    Ok(()) => write_line(&mut output, &format!("Saved history to `{}`.", path.display())).await?,
                    Err(err) => write_line(&mut output, &err.to_string()).await?,
                },
                Command::Delete(id) => {
                    let text = if history.delete(&id).await { format!("Deleted message `{id}`.") } else { format!("No message with id `{id}`.") };
                    write_line(&mut output, &text).await?;
                }
                Command::Clear => {
                    history.clear().await;
                    info!("History cleared.");

                    let cleared = ChatMessage::bot(CLEARED_MESSAGE);
                    write_line(&mut output, &render_message(&cleared)).await?;
                    history.push(cleared).await;
                }
                Command::Unknown(name) => {
                    warn!("Unknown command `{}`.", name);
                    write_line(&mut output, &format!("Unknown command `{name}`. {HELP_TEXT}")).await?;
                }
                Command::Chat(text) => {
                    // Input is not read again until this turn completes.
                    write_line(&mut output, TYPING_INDICATOR).await?;

                    if let Some(reply) = handle_chat(&text, &self.chat, &self.responder, &mut history).await {
                        write_line(&mut output, &render_message(&reply)).await?;
                    }
                }
            }
        }

        info!("Session ended.");

        Ok(())
    }
}

/// A line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Chat(String),
    History,
    Export(PathBuf),
    Delete(String),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Command::Chat(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "history" => Command::History,
            "export" if arg.is_empty() => Command::Export(PathBuf::from(DEFAULT_EXPORT_PATH)),
            "export" => Command::Export(PathBuf::from(arg)),
            "delete" if !arg.is_empty() => Command::Delete(arg.to_string()),
            "clear" => Command::Clear,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(rest.to_string()),
        }
    }
}

/// Render a message for the terminal: `[H:MM] SENDER (id): text`.
pub fn render_message(message: &ChatMessage) -> String {
    format!("[{}] {} ({}): {}", format_time(message.ts), message.sender, message.id, message.text)
}

async fn write_line<W>(output: &mut W, line: &str) -> Void
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;

    Ok(())
}
