//! Error types for rollbook operations

/// Main error type for registry operations.
///
/// Every variant is a recoverable, caller-visible business condition and
/// carries the offending key so callers can render an actionable message.
/// Preconditions are checked before any mutation begins, so an error never
/// leaves a partially-applied operation behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unauthorized: {principal} lacks the required role")]
    Unauthorized { principal: String },

    #[error("already exists: {key}")]
    AlreadyExists { key: String },

    #[error("not found: {key}")]
    NotFound { key: String },

    #[error("limit exceeded: {what}")]
    LimitExceeded { what: String },

    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error("invalid assignment slot: {slot}")]
    InvalidSlot { slot: u16 },
}

impl RegistryError {
    pub fn unauthorized(principal: impl Into<String>) -> Self {
        Self::Unauthorized {
            principal: principal.into(),
        }
    }

    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists { key: key.into() }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn limit_exceeded(what: impl Into<String>) -> Self {
        Self::LimitExceeded { what: what.into() }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
