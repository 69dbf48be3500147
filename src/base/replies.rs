//! Canned replies for the offline responder and the terminal client.

/// Built-in knowledge table as `(trigger, reply)` pairs.
///
/// Order matters: substring matching returns the first trigger found, and fuzzy matching
/// keeps the earliest trigger on ties.
pub const DEFAULT_KNOWLEDGE: &[(&str, &str)] = &[
    ("hello", "Hello! How can I assist with your computer today?"),
    ("hi", "Hi! How may I help you?"),
    ("hey", "Hey there! Need any help?"),
    ("bye", "Goodbye! Have a great day!"),
    ("slow", "If your computer is slow, try clearing temporary files, checking for malware, or upgrading your RAM."),
    ("blue screen", "Blue screens (BSOD) are often driver or hardware issues. Note the error code and restart."),
    ("thanks", "You're welcome!"),
];

/// Reply when the input looks like a question or a request for help.
pub const CLARIFICATION_REPLY: &str = "Can you provide more details? For example: OS, exact error message, when it happens.";

/// Reply when the input expresses gratitude.
pub const GRATITUDE_REPLY: &str = "You're welcome!";

/// Reply when nothing else matches.
pub const DEFAULT_REPLY: &str = "Sorry, I don't have an answer offline. Please try again or give more details.";

/// First message of an empty thread.
pub const WELCOME_MESSAGE: &str = "Hello! I am Computer Query Bot. How can I help you today?";

/// First message after the thread is cleared.
pub const CLEARED_MESSAGE: &str = "Chat cleared. How can I help you now?";

/// Placeholder shown while a reply is in flight.
pub const TYPING_INDICATOR: &str = "Typing...";

/// Error raised when exporting an empty thread.
pub const EMPTY_HISTORY_MESSAGE: &str = "No chat history to download.";
