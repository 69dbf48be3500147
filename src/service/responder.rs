//! Offline fallback responder.
//!
//! Produces a plausible reply without the remote service by matching the user text against
//! a small, ordered knowledge table:
//! - direct substring triggers,
//! - the closest trigger by Levenshtein similarity (above [`FUZZY_MATCH_THRESHOLD`]),
//! - question/help and gratitude patterns,
//! - a fixed "no offline answer" message.
//!
//! The responder is a total, deterministic function of its input.

use std::{collections::HashSet, sync::LazyLock};

use anyhow::anyhow;
use regex::Regex;
use tracing::debug;

use crate::base::{
    replies::{CLARIFICATION_REPLY, DEFAULT_KNOWLEDGE, DEFAULT_REPLY, GRATITUDE_REPLY},
    types::Res,
};

/// Minimum similarity for a fuzzy match to be accepted.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.55;

static QUESTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)how|what|why|help|problem|error|issue").unwrap());
static GRATITUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)thank|thanks").unwrap());

// Types.

/// A trigger phrase and its canned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub trigger: String,
    pub reply: String,
}

impl KnowledgeEntry {
    pub fn new(trigger: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            reply: reply.into(),
        }
    }
}

/// Ordered, validated knowledge table.
///
/// Triggers are unique, non-empty, lowercase, and trimmed. Iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Res<Self> {
        let mut seen = HashSet::new();

        for entry in &entries {
            if entry.trigger.is_empty() {
                return Err(anyhow!("Knowledge trigger must not be empty."));
            }

            if entry.trigger != entry.trigger.trim() || entry.trigger != entry.trigger.to_lowercase() {
                return Err(anyhow!("Knowledge trigger `{}` must be trimmed and lowercase.", entry.trigger));
            }

            if entry.reply.is_empty() {
                return Err(anyhow!("Knowledge trigger `{}` has an empty reply.", entry.trigger));
            }

            if !seen.insert(entry.trigger.as_str()) {
                return Err(anyhow!("Knowledge trigger `{}` is duplicated.", entry.trigger));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        let entries = DEFAULT_KNOWLEDGE.iter().map(|(trigger, reply)| KnowledgeEntry::new(*trigger, *reply)).collect();

        Self { entries }
    }
}

/// The offline responder.
///
/// Cheap to clone, with no interior state, so it can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct FallbackResponder {
    knowledge: KnowledgeBase,
}

impl FallbackResponder {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self { knowledge }
    }

    /// Produce a reply for `text`. Never fails and always returns a non-empty string.
    pub fn respond(&self, text: &str) -> String {
        let text = text.trim().to_lowercase();

        // Direct substring triggers.

        if let Some(entry) = self.knowledge.entries.iter().find(|e| text.contains(e.trigger.as_str())) {
            debug!(trigger = %entry.trigger, "Offline reply from substring trigger.");
            return entry.reply.clone();
        }

        // Best fuzzy match; later candidates only win on a strictly greater score.

        let mut best: Option<&KnowledgeEntry> = None;
        let mut best_score = 0.0;

        for entry in &self.knowledge.entries {
            let score = similarity(&text, &entry.trigger);
            if score > best_score {
                best_score = score;
                best = Some(entry);
            }
        }

        if let Some(entry) = best
            && best_score >= FUZZY_MATCH_THRESHOLD
        {
            debug!(trigger = %entry.trigger, score = best_score, "Offline reply from fuzzy match.");
            return entry.reply.clone();
        }

        // Rule-based fallbacks.

        if QUESTION_PATTERN.is_match(&text) {
            debug!("Offline reply from question rule.");
            return CLARIFICATION_REPLY.to_string();
        }

        if GRATITUDE_PATTERN.is_match(&text) {
            debug!("Offline reply from gratitude rule.");
            return GRATITUDE_REPLY.to_string();
        }

        debug!("No offline match.");
        DEFAULT_REPLY.to_string()
    }
}

// Helpers.

/// Levenshtein distance between `a` and `b`, ignoring case.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1).min(dp[i][j - 1] + 1).min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// Similarity in `[0, 1]`: `1 - distance / max(len)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    let longest = a.chars().count().max(b.chars().count());

    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}
