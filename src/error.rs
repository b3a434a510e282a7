use std::fmt;

use crate::context::Interrupted;

/// Failure inside one of the catalog, image or rating stores.
///
/// A missing entry is not an error: lookups return `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    AlreadyExists(String),
    LockPoisoned(&'static str),
    Io(String),
    Serde(String),
    Overflow(String),
    Interrupted(Interrupted),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::AlreadyExists(id) => write!(f, "record already exists: {}", id),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Io(message) => write!(f, "store i/o error: {}", message),
            StoreError::Serde(message) => write!(f, "store encoding error: {}", message),
            StoreError::Overflow(what) => write!(f, "{} would overflow", what),
            StoreError::Interrupted(reason) => write!(f, "scan interrupted: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Interrupted(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<Interrupted> for StoreError {
    fn from(reason: Interrupted) -> Self {
        StoreError::Interrupted(reason)
    }
}
