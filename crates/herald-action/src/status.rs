//! Task-tracking document parsing for `check-status`.
//!
//! Counts checklist items and status glyphs in a markdown document and
//! extracts the leading incomplete items.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Glyphs that mark an item as still in flight.
const INCOMPLETE_GLYPHS: [char; 2] = ['⏳', '🔄'];
/// Glyph that marks an item as finished.
const COMPLETE_GLYPH: char = '✅';
/// Emoji presentation selector that may trail a glyph.
const VARIATION_SELECTOR: char = '\u{fe0f}';

/// Counts and leading incomplete items of a status document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub complete: usize,
    pub incomplete: usize,
    pub pending_items: Vec<String>,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.complete + self.incomplete
    }
}

/// Report returned in the `check-status` task descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub project: String,
    pub document: String,
    pub complete: usize,
    pub incomplete: usize,
    pub total: usize,
    pub pending_items: Vec<String>,
}

enum LineState {
    Complete,
    Incomplete(String),
}

/// Compiled checkbox patterns, built once per handler.
pub struct StatusParser {
    unchecked: Regex,
    checked: Regex,
    list_prefix: Regex,
}

impl Default for StatusParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusParser {
    pub fn new() -> Self {
        Self {
            unchecked: Regex::new(r"^\s*[-*+]\s*\[ \]\s*(.*)$").expect("Invalid unchecked regex"),
            checked: Regex::new(r"^\s*[-*+]\s*\[[xX]\]").expect("Invalid checked regex"),
            list_prefix: Regex::new(r"^\s*(?:[-*+]|\d+\.)?\s*").expect("Invalid list regex"),
        }
    }

    /// Parse `text`, keeping at most `max_items` incomplete item texts.
    pub fn parse(&self, text: &str, max_items: usize) -> StatusSummary {
        let mut summary = StatusSummary::default();

        for line in text.lines() {
            match self.classify(line) {
                Some(LineState::Complete) => summary.complete += 1,
                Some(LineState::Incomplete(item)) => {
                    summary.incomplete += 1;
                    if summary.pending_items.len() < max_items && !item.is_empty() {
                        summary.pending_items.push(item);
                    }
                }
                None => {}
            }
        }

        summary
    }

    fn classify(&self, line: &str) -> Option<LineState> {
        if let Some(caps) = self.unchecked.captures(line) {
            let item = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            return Some(LineState::Incomplete(item));
        }
        if self.checked.is_match(line) || line.contains(COMPLETE_GLYPH) {
            return Some(LineState::Complete);
        }
        if line.contains(&INCOMPLETE_GLYPHS[..]) {
            let without_glyphs: String = line
                .chars()
                .filter(|c| !INCOMPLETE_GLYPHS.contains(c) && *c != VARIATION_SELECTOR)
                .collect();
            let item = self
                .list_prefix
                .replace(&without_glyphs, "")
                .trim()
                .to_string();
            return Some(LineState::Incomplete(item));
        }
        None
    }
}

/// Parse a status document with a freshly built parser.
pub fn parse_status_document(text: &str, max_items: usize) -> StatusSummary {
    StatusParser::new().parse(text, max_items)
}
