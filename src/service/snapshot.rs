//! Snapshot and restore
//!
//! A snapshot carries everything needed to reconstruct the registry:
//! owner, admin ceiling, and both entity sets in slot order. Reverse maps
//! are rebuilt on restore rather than serialized, so a snapshot cannot
//! encode an inconsistent index.

use serde::{Deserialize, Serialize};

use crate::events::ChangeSink;
use crate::index::IndexedRegistry;
use crate::students::StudentRecord;
use crate::types::{Principal, RegistryError, Result};

use super::Rollbook;

/// Serializable image of a [`Rollbook`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbookSnapshot {
    pub owner: Principal,
    pub admin_limit: usize,
    /// Admin principals in slot order
    pub admins: Vec<Principal>,
    /// Student records in slot order; the email key lives inside the record
    pub students: Vec<StudentRecord>,
}

impl Rollbook {
    /// Capture the current state for durable storage
    pub fn snapshot(&self) -> RollbookSnapshot {
        let (owner, admin_limit, admins, students) = self.parts();
        RollbookSnapshot {
            owner: owner.clone(),
            admin_limit,
            admins: admins.iter().map(|(k, _)| k.clone()).collect(),
            students: students.iter().map(|(_, v)| v.clone()).collect(),
        }
    }

    /// Rebuild a registry from a snapshot
    pub fn restore(snapshot: RollbookSnapshot) -> Result<Self> {
        Self::restore_inner(snapshot, None)
    }

    /// Rebuild a registry from a snapshot, attaching a change sink
    pub fn restore_with_sink(snapshot: RollbookSnapshot, sink: Box<dyn ChangeSink>) -> Result<Self> {
        Self::restore_inner(snapshot, Some(sink))
    }

    fn restore_inner(
        snapshot: RollbookSnapshot,
        sink: Option<Box<dyn ChangeSink>>,
    ) -> Result<Self> {
        if snapshot.admins.is_empty() {
            return Err(RegistryError::invariant("snapshot carries zero admins"));
        }
        if !snapshot.admins.contains(&snapshot.owner) {
            return Err(RegistryError::invariant(
                "snapshot owner is not on the admin roster",
            ));
        }
        if snapshot.admin_limit < snapshot.admins.len() {
            return Err(RegistryError::invariant(
                "snapshot admin roster exceeds its own limit",
            ));
        }

        let mut admins = IndexedRegistry::new();
        for principal in snapshot.admins {
            admins.insert(principal, ())?;
        }
        let mut students = IndexedRegistry::new();
        for record in snapshot.students {
            let email = record.email.clone();
            students.insert(email, record)?;
        }

        Ok(Rollbook::from_parts(
            snapshot.owner,
            snapshot.admin_limit,
            admins,
            students,
            sink,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignments::AssignmentStatus;
    use crate::config::RollbookConfig;
    use crate::students::{Commendation, Grade};

    fn populated() -> Rollbook {
        let owner = Principal::from("0xowner");
        let mut book = Rollbook::new(owner.clone(), RollbookConfig::default()).unwrap();
        book.add_admin(&owner, Principal::from("0xb")).unwrap();
        book.add_student(
            &owner,
            "Ada",
            "Lovelace",
            "a@x.com",
            Commendation::new("sharp").unwrap(),
            Grade::Great,
        )
        .unwrap();
        book.add_assignment(&owner, "a@x.com", "L1", AssignmentStatus::Pending, false)
            .unwrap();
        book.remove_student(&owner, "a@x.com").unwrap();
        book.add_student(
            &owner,
            "Bob",
            "B",
            "b@x.com",
            Commendation::default(),
            Grade::Good,
        )
        .unwrap();
        book
    }

    #[test]
    fn test_snapshot_round_trip() {
        let book = populated();
        let snapshot = book.snapshot();

        // Survives serialization
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: RollbookSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Rollbook::restore(parsed).unwrap();

        assert_eq!(restored.owner(), book.owner());
        assert_eq!(restored.admin_count(), 2);
        assert_eq!(
            restored.admin_slot_of(&Principal::from("0xb")),
            book.admin_slot_of(&Principal::from("0xb"))
        );
        assert_eq!(restored.student_count(), 2);
        // Soft-deleted record survives with its ledger
        let ada = restored.get_student("a@x.com").unwrap();
        assert!(!ada.active);
        assert_eq!(restored.get_assignment("a@x.com", 1).unwrap().link, "L1");
    }

    #[test]
    fn test_restore_rejects_ownerless_snapshot() {
        let mut snapshot = populated().snapshot();
        snapshot.owner = Principal::from("0xghost");
        assert!(matches!(
            Rollbook::restore(snapshot).unwrap_err(),
            RegistryError::InvariantViolation { .. }
        ));
    }

    #[test]
    fn test_restore_rejects_empty_roster() {
        let mut snapshot = populated().snapshot();
        snapshot.admins.clear();
        assert!(Rollbook::restore(snapshot).is_err());
    }

    #[test]
    fn test_restored_registry_accepts_mutations() {
        let book = populated();
        let mut restored = Rollbook::restore(book.snapshot()).unwrap();
        let owner = Principal::from("0xowner");
        restored
            .update_student_grade(&owner, "b@x.com", Grade::Outstanding)
            .unwrap();
        assert_eq!(
            restored.get_student("b@x.com").unwrap().grade,
            Grade::Outstanding
        );
    }
}
