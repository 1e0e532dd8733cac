//! Message values
//!
//! A message is an immutable value carried by a topic. It exposes three views
//! of the same payload (text, number, raw bytes) computed once at construction.

use chrono::{DateTime, Utc};
use std::fmt;

/// Immutable payload published on a topic.
#[derive(Clone)]
pub struct Message {
    bytes: Vec<u8>,
    text: String,
    numeric: f64,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message from text. The numeric view is NaN when the trimmed
    /// text does not parse as a number.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let numeric = text.trim().parse::<f64>().unwrap_or(f64::NAN);
        Self {
            bytes: text.as_bytes().to_vec(),
            text,
            numeric,
            created_at: Utc::now(),
        }
    }

    /// Build a message from a number, formatted so that integral values keep
    /// a fractional part (`2.0`).
    pub fn from_f64(value: f64) -> Self {
        Self::from_text(format!("{:?}", value))
    }

    /// Build a message from raw bytes, decoded as UTF-8 (invalid sequences are
    /// replaced).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Numeric view; NaN when the text is not a number.
    pub fn numeric(&self) -> f64 {
        self.numeric
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when the numeric view holds a parsed number.
    pub fn is_numeric(&self) -> bool {
        !self.numeric.is_nan()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("text", &self.text)
            .field("numeric", &self.numeric)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::from_text(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::from_text(text)
    }
}

impl From<f64> for Message {
    fn from(value: f64) -> Self {
        Message::from_f64(value)
    }
}
