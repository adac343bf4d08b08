pub mod content;
pub mod ingest;
pub mod reputation;
pub mod vote;

use std::fmt;

pub use content::{Difficulty, QuestionType, Role};
pub use ingest::{NormalizedQuestion, QuestionSource, SourceError};
pub use reputation::{ReferenceType, ReputationReason, VOUCHER_MILESTONE};
pub use vote::{VoteTarget, VoteType};

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    invalid: String,
    valid: Vec<&'static str>,
}

impl ParseEnumError {
    pub fn new<I>(kind: &'static str, invalid: &str, valid: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            kind,
            invalid: invalid.to_string(),
            valid: valid.into_iter().collect(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Valid values: {}",
            self.kind,
            self.invalid,
            self.valid.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}
