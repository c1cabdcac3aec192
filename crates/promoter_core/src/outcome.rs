use std::fmt;

use crate::sanitize::sanitize;

/// Reply prefix a host uses to refuse promoting a URL.
pub const VETO_PREFIX: &str = "Reject:";

/// What became of one dispatched URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sanitized promotion text, ready to be written.
    Success(String),
    /// The host vetoed the URL; carries the reason after the prefix.
    Rejected(String),
    /// The host call failed.
    Failed(String),
}

impl Outcome {
    /// Turn a raw host reply into an outcome.
    ///
    /// The reply text is sanitized first. Empty text counts as a failure and
    /// text starting with [`VETO_PREFIX`] as a rejection.
    pub fn classify<E: fmt::Display>(reply: Result<String, E>) -> Self {
        let text = match reply {
            Ok(text) => sanitize(&text),
            Err(err) => return Outcome::Failed(err.to_string()),
        };
        if text.is_empty() {
            return Outcome::Failed("empty promotion".to_string());
        }
        match text.strip_prefix(VETO_PREFIX) {
            Some(reason) => Outcome::Rejected(reason.trim().to_string()),
            None => Outcome::Success(text),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(text) => write!(f, "promoted: {text}"),
            Outcome::Rejected(reason) => write!(f, "rejected: {reason}"),
            Outcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
