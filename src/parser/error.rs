//! Parser error type.

use thiserror::Error;

/// Errors produced while parsing input URLs.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input string is not a URL at all.
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
}

impl ParseError {
    pub fn malformed_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
