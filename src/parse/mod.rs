//! Parsers for raw probe output.
//!
//! Probe output is loosely formatted, so every parser scans line by line and
//! skips what it does not recognize. Nothing here returns an error: missing
//! data is reported through [`ParseOutcome`].

mod dns;
mod netstat;
mod ping;
mod route;

pub use dns::*;
pub use netstat::*;
pub use ping::*;
pub use route::*;

use serde::Serialize;

/// Result of parsing one probe's output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// At least one line matched.
    Parsed(T),
    /// The probe produced no text (failed or silent).
    NoOutput,
    /// Text was present but nothing in it matched.
    NoMatch,
}

impl<T> ParseOutcome<T> {
    /// Classify the result of a scan over `text`.
    pub(crate) fn from_scan(text: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => ParseOutcome::Parsed(v),
            None if text.trim().is_empty() => ParseOutcome::NoOutput,
            None => ParseOutcome::NoMatch,
        }
    }

    pub fn state(&self) -> ParseState {
        match self {
            ParseOutcome::Parsed(_) => ParseState::Parsed,
            ParseOutcome::NoOutput => ParseState::NoOutput,
            ParseOutcome::NoMatch => ParseState::NoMatch,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            ParseOutcome::Parsed(v) => Some(v),
            _ => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            ParseOutcome::Parsed(v) => v,
            _ => default,
        }
    }
}

impl<T: Default> ParseOutcome<T> {
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or(T::default())
    }
}

/// Serializable tag of a [`ParseOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseState {
    Parsed,
    NoOutput,
    NoMatch,
}

/// `None` for an empty list.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
