use thiserror::Error;

use crate::enums::Bank;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Start offset {start} of {bank} outside of 0..=9999")]
    InvalidStart { bank: Bank, start: u16 },
    #[error("Count {count} of {bank} outside of 1..=10")]
    InvalidCount { bank: Bank, count: u8 },
    #[error("{bank} [{offset}, {end}) exceeds the store capacity of {capacity}")]
    OutOfRange {
        bank: Bank,
        offset: usize,
        end: usize,
        capacity: usize,
    },
    #[error("{bank} does not hold {found} values")]
    Mismatch { bank: Bank, found: &'static str },
    #[error("Register store lock poisoned")]
    Poisoned,
    #[error("Unknown bank '{0}'")]
    UnknownBank(String),
    #[error(transparent)]
    Memory(#[from] memory::Error),
}

impl Error {
    /// Operator input outside of the allowed window bounds
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidStart { .. } | Self::InvalidCount { .. })
    }
}

/// A single cell could not be parsed and a default was substituted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{token}' is not a valid {expected} for {bank}")]
pub struct ParseError {
    pub bank: Bank,
    pub token: String,
    pub expected: &'static str,
}
