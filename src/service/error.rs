//! Protocol-level error taxonomy of the laptop service.

use std::error::Error;
use std::fmt;

use tonic::{Code, Status};

use crate::context::Interrupted;
use crate::error::StoreError;

/// Error returned by a `LaptopServer` operation.
///
/// Store errors never escape verbatim: they are wrapped with the operation
/// that hit them and mapped onto one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed identifier, oversized upload, or unknown owner at upload time.
    InvalidArgument(String),
    /// Duplicate catalog identifier.
    AlreadyExists(String),
    /// Rating submitted for an unknown laptop.
    NotFound(String),
    /// Store failure.
    Internal(String),
    /// Malformed stream message or broken inbound stream.
    Unknown(String),
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            ServiceError::AlreadyExists(msg) => write!(f, "already exists: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "not found: {}", msg),
            ServiceError::Internal(msg) => write!(f, "internal: {}", msg),
            ServiceError::Unknown(msg) => write!(f, "unknown: {}", msg),
            ServiceError::Cancelled => write!(f, "{}", Interrupted::Cancelled),
            ServiceError::DeadlineExceeded => write!(f, "{}", Interrupted::DeadlineExceeded),
        }
    }
}

impl Error for ServiceError {}

impl ServiceError {
    /// Map a store failure hit while doing `action`.
    pub fn from_store(action: &str, err: StoreError) -> Self {
        match err {
            StoreError::Interrupted(reason) => reason.into(),
            StoreError::AlreadyExists(_) => {
                ServiceError::AlreadyExists(format!("{}: {}", action, err))
            }
            other => ServiceError::Internal(format!("{}: {}", action, other)),
        }
    }

    /// The gRPC status code for this error.
    pub fn code(&self) -> Code {
        match self {
            ServiceError::InvalidArgument(_) => Code::InvalidArgument,
            ServiceError::AlreadyExists(_) => Code::AlreadyExists,
            ServiceError::NotFound(_) => Code::NotFound,
            ServiceError::Internal(_) => Code::Internal,
            ServiceError::Unknown(_) => Code::Unknown,
            ServiceError::Cancelled => Code::Cancelled,
            ServiceError::DeadlineExceeded => Code::DeadlineExceeded,
        }
    }

    /// Log the error where it was detected and hand it back for propagation.
    pub fn logged(self) -> Self {
        match self.code() {
            Code::Internal | Code::Unknown => tracing::error!(code = ?self.code(), "{}", self),
            _ => tracing::warn!(code = ?self.code(), "{}", self),
        }
        self
    }
}

impl From<Interrupted> for ServiceError {
    fn from(reason: Interrupted) -> Self {
        match reason {
            Interrupted::Cancelled => ServiceError::Cancelled,
            Interrupted::DeadlineExceeded => ServiceError::DeadlineExceeded,
        }
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        let message = match &err {
            ServiceError::InvalidArgument(msg)
            | ServiceError::AlreadyExists(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::Internal(msg)
            | ServiceError::Unknown(msg) => msg.clone(),
            ServiceError::Cancelled | ServiceError::DeadlineExceeded => err.to_string(),
        };
        Status::new(err.code(), message)
    }
}
