use std::fmt;

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Who wrote a message in the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Uppercase label used in exported transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "USER",
            Sender::Bot => "BOT",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single message in the chat thread, as persisted in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Short unique identifier (used to delete single messages).
    pub id: String,
    /// Author of the message.
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl ChatMessage {
    /// Create a message stamped with the current time and a fresh id.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: make_id(),
            sender,
            text: text.into(),
            ts: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

/// Build a short id: base-36 milliseconds followed by six random base-36 characters.
pub fn make_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;

    format!("{}{}", to_base36(millis), random_base36(6))
}

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}

/// `len` base-36 characters drawn from the random bits of a v4 uuid (at most 24).
fn random_base36(len: usize) -> String {
    let mut bits = uuid::Uuid::new_v4().as_u128();

    (0..len)
        .map(|_| {
            let digit = BASE36_DIGITS[(bits % 36) as usize] as char;
            bits /= 36;
            digit
        })
        .collect()
}

/// Format a millisecond timestamp as `H:MM` in the given timezone.
pub fn format_time_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(ts).unwrap_or_default();
    let local = utc.with_timezone(tz);

    format!("{}:{:02}", local.hour(), local.minute())
}

/// Format a millisecond timestamp as `H:MM` local time.
pub fn format_time(ts: i64) -> String {
    format_time_in(ts, &Local)
}
