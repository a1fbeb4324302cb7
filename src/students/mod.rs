//! Student records
//!
//! Students are identified by email and soft-deleted: removal flips the
//! `active` flag and keeps the record in place for auditing and later
//! re-registration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assignments::AssignmentLedger;
use crate::types::{RegistryError, Result};

/// Maximum commendation length in bytes
pub const COMMENDATION_MAX_BYTES: usize = 32;

/// Grade awarded to a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Good,
    Great,
    Outstanding,
    Epic,
    Legendary,
}

/// Short commendation text, bounded to 32 bytes.
///
/// The bound is enforced at construction; a `Commendation` in hand is
/// always within limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Commendation(String);

impl Commendation {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.len() > COMMENDATION_MAX_BYTES {
            return Err(RegistryError::limit_exceeded(format!(
                "commendation exceeds {} bytes",
                COMMENDATION_MAX_BYTES
            )));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered student.
///
/// `active == false` marks a soft-deleted record; mutations require an
/// active record, reads do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub commendation: Commendation,
    pub grade: Grade,
    pub active: bool,
    pub assignments: AssignmentLedger,
}

impl StudentRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        commendation: Commendation,
        grade: Grade,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            commendation,
            grade,
            active: true,
            assignments: AssignmentLedger::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commendation_bound() {
        assert!(Commendation::new("top of the class").is_ok());
        assert!(Commendation::new("x".repeat(32)).is_ok());
        let err = Commendation::new("x".repeat(33)).unwrap_err();
        assert!(matches!(err, RegistryError::LimitExceeded { .. }));
    }

    #[test]
    fn test_new_record_is_active_with_fresh_ledger() {
        let record = StudentRecord::new(
            "Ada",
            "Lovelace",
            "ada@example.com",
            Commendation::default(),
            Grade::Legendary,
        );
        assert!(record.active);
        assert_eq!(record.assignments.counter(), 0);
    }
}
