//! Source citations produced by retrieval tools.

use serde::{Deserialize, Serialize};

/// Separator between label and link in the encoded form.
///
/// Labels are built from course titles and lesson numbers and never contain it.
pub const LINK_SEPARATOR: char = '|';

/// One citable source behind a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Display label, e.g. `Test Course - Lesson 1`.
    pub label: String,
    /// Lesson deep link, when the store has one.
    pub link: Option<String>,
}

impl Provenance {
    pub fn new(label: impl Into<String>, link: Option<String>) -> Self {
        Self {
            label: label.into(),
            link,
        }
    }

    /// Label, followed by `|link` when a link is present.
    pub fn encode(&self) -> String {
        match &self.link {
            Some(link) => format!("{}{}{}", self.label, LINK_SEPARATOR, link),
            None => self.label.clone(),
        }
    }

    /// Split an encoded entry back into label and link.
    pub fn decode(encoded: &str) -> Self {
        match encoded.split_once(LINK_SEPARATOR) {
            Some((label, link)) if !link.is_empty() => Self::new(label, Some(link.to_string())),
            Some((label, _)) => Self::new(label, None),
            None => Self::new(encoded, None),
        }
    }
}
