//! The rollbook registry service
//!
//! Composes the admin index, the student index, and per-student assignment
//! ledgers behind a role-gated boundary API. Every mutating method takes
//! the calling principal, authorizes it first, checks all preconditions
//! before touching state, and emits one change record on success.

mod shared;
mod snapshot;

pub use shared::SharedRollbook;
pub use snapshot::RollbookSnapshot;

use tracing::info;

use crate::assignments::{Assignment, AssignmentStatus};
use crate::auth::{is_operation_allowed, Operation, Role};
use crate::config::RollbookConfig;
use crate::events::{ChangeRecord, ChangeSink, EntityKind};
use crate::index::IndexedRegistry;
use crate::students::{Commendation, Grade, StudentRecord};
use crate::types::{Principal, RegistryError, Result};

/// In-memory registry of administrators, students, and assignments.
///
/// Strictly single-writer: each method runs to completion with exclusive
/// access (`&mut self`). Multi-threaded hosts wrap the whole service in a
/// [`SharedRollbook`].
pub struct Rollbook {
    owner: Principal,
    admin_limit: usize,
    admins: IndexedRegistry<Principal, ()>,
    students: IndexedRegistry<String, StudentRecord>,
    sink: Option<Box<dyn ChangeSink>>,
}

impl std::fmt::Debug for Rollbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rollbook")
            .field("owner", &self.owner)
            .field("admin_limit", &self.admin_limit)
            .field("admins", &self.admins)
            .field("students", &self.students)
            .field("sink", &self.sink.as_ref().map(|_| "dyn ChangeSink"))
            .finish()
    }
}

impl Rollbook {
    /// Create a registry with the given owner, who becomes the first admin
    pub fn new(owner: Principal, config: RollbookConfig) -> Result<Self> {
        Self::build(owner, config, None)
    }

    /// Create a registry that emits change records to the given sink
    pub fn with_sink(
        owner: Principal,
        config: RollbookConfig,
        sink: Box<dyn ChangeSink>,
    ) -> Result<Self> {
        Self::build(owner, config, Some(sink))
    }

    fn build(
        owner: Principal,
        config: RollbookConfig,
        sink: Option<Box<dyn ChangeSink>>,
    ) -> Result<Self> {
        config.validate()?;
        let mut admins = IndexedRegistry::new();
        admins.insert(owner.clone(), ())?;
        info!("Rollbook created, owner: {}", owner);
        Ok(Self {
            owner,
            admin_limit: config.admin_limit,
            admins,
            students: IndexedRegistry::new(),
            sink,
        })
    }

    // ---- authorization ----

    fn role_of(&self, principal: &Principal) -> Option<Role> {
        if *principal == self.owner {
            Some(Role::Owner)
        } else if self.admins.contains_key(principal) {
            Some(Role::Admin)
        } else {
            None
        }
    }

    /// Fail with `Unauthorized` unless the caller may perform the operation
    fn authorize(&self, caller: &Principal, operation: Operation) -> Result<()> {
        if is_operation_allowed(operation, self.role_of(caller)) {
            Ok(())
        } else {
            Err(RegistryError::unauthorized(caller.to_string()))
        }
    }

    fn emit(&self, record: ChangeRecord) {
        if let Some(sink) = &self.sink {
            sink.record(&record);
        }
    }

    // ---- admin roster ----

    /// Authorize a new administrator
    pub fn add_admin(&mut self, caller: &Principal, principal: Principal) -> Result<()> {
        self.authorize(caller, Operation::AddAdmin)?;
        if self.admins.contains_key(&principal) {
            return Err(RegistryError::already_exists(principal.to_string()));
        }
        if self.admins.len() >= self.admin_limit {
            return Err(RegistryError::limit_exceeded(format!(
                "admin limit {} reached",
                self.admin_limit
            )));
        }
        let slot = self.admins.insert(principal.clone(), ())?;
        info!("Authorized admin {} at slot {}", principal, slot);
        self.emit(ChangeRecord::new(
            EntityKind::Admin,
            Operation::AddAdmin.name(),
            principal.to_string(),
        ));
        Ok(())
    }

    /// Remove an administrator via swap-compaction.
    ///
    /// The owner cannot be removed this way; use ownership transfer.
    pub fn remove_admin(&mut self, caller: &Principal, principal: &Principal) -> Result<()> {
        self.authorize(caller, Operation::RemoveAdmin)?;
        if *principal == self.owner {
            return Err(RegistryError::invariant("owner cannot be removed as admin"));
        }
        if !self.admins.contains_key(principal) {
            return Err(RegistryError::not_found(principal.to_string()));
        }
        if self.admins.len() == 1 {
            return Err(RegistryError::invariant("removal would leave zero admins"));
        }
        self.admins.remove(principal)?;
        info!("Removed admin {}", principal);
        self.emit(ChangeRecord::new(
            EntityKind::Admin,
            Operation::RemoveAdmin.name(),
            principal.to_string(),
        ));
        Ok(())
    }

    /// Change the admin ceiling. Owner-gated; cannot drop below the current
    /// roster size.
    pub fn set_admin_limit(&mut self, caller: &Principal, limit: usize) -> Result<()> {
        self.authorize(caller, Operation::SetAdminLimit)?;
        if limit == 0 {
            return Err(RegistryError::invariant(
                "admin limit must allow at least the owner",
            ));
        }
        if limit < self.admins.len() {
            return Err(RegistryError::invariant(format!(
                "admin limit {} is below the current roster of {}",
                limit,
                self.admins.len()
            )));
        }
        self.admin_limit = limit;
        info!("Admin limit set to {}", limit);
        self.emit(
            ChangeRecord::new(
                EntityKind::Admin,
                Operation::SetAdminLimit.name(),
                caller.to_string(),
            )
            .with_detail(serde_json::json!({ "limit": limit })),
        );
        Ok(())
    }

    /// Transfer ownership: the old owner leaves the admin roster, the new
    /// owner joins it (if not already on it), and the owner field commits.
    /// All-or-nothing: every precondition is checked before any mutation.
    pub fn transfer_ownership(&mut self, caller: &Principal, new_owner: Principal) -> Result<()> {
        self.authorize(caller, Operation::TransferOwnership)?;
        if new_owner == self.owner {
            return Err(RegistryError::invariant(
                "new owner is already the current owner",
            ));
        }
        // No fallible step below: the old owner is always on the roster,
        // and removing before inserting keeps the count within the limit.
        let old_owner = std::mem::replace(&mut self.owner, new_owner.clone());
        self.admins.remove(&old_owner)?;
        if !self.admins.contains_key(&new_owner) {
            self.admins.insert(new_owner.clone(), ())?;
        }
        info!("Ownership transferred from {} to {}", old_owner, new_owner);
        self.emit(
            ChangeRecord::new(
                EntityKind::Ownership,
                Operation::TransferOwnership.name(),
                new_owner.to_string(),
            )
            .with_detail(serde_json::json!({
                "from": old_owner.to_string(),
                "to": new_owner.to_string(),
            })),
        );
        Ok(())
    }

    // ---- students ----

    /// Register a student, or reactivate a soft-deleted record under the
    /// same email with all fields reset
    pub fn add_student(
        &mut self,
        caller: &Principal,
        first_name: &str,
        last_name: &str,
        email: &str,
        commendation: Commendation,
        grade: Grade,
    ) -> Result<()> {
        self.authorize(caller, Operation::AddStudent)?;
        let record = StudentRecord::new(first_name, last_name, email, commendation, grade);
        let reactivated = match self.students.get_mut(&email.to_string()) {
            Some(existing) if existing.active => {
                return Err(RegistryError::already_exists(email));
            }
            Some(existing) => {
                // Soft-deleted slot is reused; everything resets, ledger included
                *existing = record;
                true
            }
            None => {
                self.students.insert(email.to_string(), record)?;
                false
            }
        };
        info!(
            "Registered student {} (reactivated: {})",
            email, reactivated
        );
        self.emit(
            ChangeRecord::new(EntityKind::Student, Operation::AddStudent.name(), email)
                .with_detail(serde_json::json!({ "reactivated": reactivated })),
        );
        Ok(())
    }

    /// Soft-delete a student. The record keeps its slot for auditing.
    pub fn remove_student(&mut self, caller: &Principal, email: &str) -> Result<()> {
        self.authorize(caller, Operation::RemoveStudent)?;
        let record = self.active_student_mut(email)?;
        record.active = false;
        info!("Deactivated student {}", email);
        self.emit(ChangeRecord::new(
            EntityKind::Student,
            Operation::RemoveStudent.name(),
            email,
        ));
        Ok(())
    }

    pub fn update_student_name(
        &mut self,
        caller: &Principal,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        self.authorize(caller, Operation::UpdateStudentName)?;
        let record = self.active_student_mut(email)?;
        record.first_name = first_name.to_string();
        record.last_name = last_name.to_string();
        self.emit(ChangeRecord::new(
            EntityKind::Student,
            Operation::UpdateStudentName.name(),
            email,
        ));
        Ok(())
    }

    pub fn update_student_commendation(
        &mut self,
        caller: &Principal,
        email: &str,
        commendation: Commendation,
    ) -> Result<()> {
        self.authorize(caller, Operation::UpdateStudentCommendation)?;
        let record = self.active_student_mut(email)?;
        record.commendation = commendation;
        self.emit(ChangeRecord::new(
            EntityKind::Student,
            Operation::UpdateStudentCommendation.name(),
            email,
        ));
        Ok(())
    }

    pub fn update_student_grade(
        &mut self,
        caller: &Principal,
        email: &str,
        grade: Grade,
    ) -> Result<()> {
        self.authorize(caller, Operation::UpdateStudentGrade)?;
        let record = self.active_student_mut(email)?;
        record.grade = grade;
        self.emit(ChangeRecord::new(
            EntityKind::Student,
            Operation::UpdateStudentGrade.name(),
            email,
        ));
        Ok(())
    }

    /// Change a student's email, remapping the reverse index atomically.
    ///
    /// Fails if the old email is not active or the new email belongs to an
    /// active record; a soft-deleted record occupying the new email is
    /// evicted. On failure both mappings are exactly as before.
    pub fn update_student_email(
        &mut self,
        caller: &Principal,
        old_email: &str,
        new_email: &str,
    ) -> Result<()> {
        self.authorize(caller, Operation::UpdateStudentEmail)?;
        match self.students.get(&old_email.to_string()) {
            Some(record) if record.active => {}
            _ => return Err(RegistryError::not_found(old_email)),
        }
        if let Some(existing) = self.students.get(&new_email.to_string()) {
            if existing.active {
                return Err(RegistryError::already_exists(new_email));
            }
            // Stale soft-deleted record stands in the way of the rename
            self.students.remove(&new_email.to_string())?;
        }
        self.students
            .rekey(&old_email.to_string(), new_email.to_string())?;
        if let Some(record) = self.students.get_mut(&new_email.to_string()) {
            record.email = new_email.to_string();
        }
        info!("Student email changed: {} -> {}", old_email, new_email);
        self.emit(
            ChangeRecord::new(
                EntityKind::Student,
                Operation::UpdateStudentEmail.name(),
                new_email,
            )
            .with_detail(serde_json::json!({ "from": old_email, "to": new_email })),
        );
        Ok(())
    }

    // ---- assignments ----

    /// Add an assignment for a student: the final project always occupies
    /// slot 0, regular assignments take the next counter slot
    pub fn add_assignment(
        &mut self,
        caller: &Principal,
        email: &str,
        link: &str,
        status: AssignmentStatus,
        is_final_project: bool,
    ) -> Result<u16> {
        self.authorize(caller, Operation::AddAssignment)?;
        let record = self.active_student_mut(email)?;
        let slot = record.assignments.allocate_slot(is_final_project)?;
        record.assignments.write(slot, link.to_string(), status);
        info!("Assignment written for {} at slot {}", email, slot);
        self.emit(
            ChangeRecord::new(EntityKind::Assignment, Operation::AddAssignment.name(), email)
                .with_detail(serde_json::json!({
                    "slot": slot,
                    "final_project": is_final_project,
                })),
        );
        Ok(slot)
    }

    /// Update the status of the final project or of the most recently
    /// added regular assignment
    pub fn update_assignment_status(
        &mut self,
        caller: &Principal,
        email: &str,
        status: AssignmentStatus,
        is_final_project: bool,
    ) -> Result<u16> {
        self.authorize(caller, Operation::UpdateAssignmentStatus)?;
        let record = self.active_student_mut(email)?;
        let slot = record.assignments.latest_slot(is_final_project)?;
        record.assignments.write_status(slot, status);
        self.emit(
            ChangeRecord::new(
                EntityKind::Assignment,
                Operation::UpdateAssignmentStatus.name(),
                email,
            )
            .with_detail(serde_json::json!({ "slot": slot })),
        );
        Ok(slot)
    }

    // ---- reads (ungated) ----

    /// Look up a student record by email, active or not
    pub fn get_student(&self, email: &str) -> Option<&StudentRecord> {
        self.students.get(&email.to_string())
    }

    /// Read an assignment. Soft-deleted students stay readable for audit.
    pub fn get_assignment(&self, email: &str, slot: u16) -> Result<&Assignment> {
        let record = self
            .students
            .get(&email.to_string())
            .ok_or_else(|| RegistryError::not_found(email))?;
        record.assignments.read(slot)
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn admin_limit(&self) -> usize {
        self.admin_limit
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.admins.contains_key(principal)
    }

    /// Current dense slot of an admin, if authorized
    pub fn admin_slot_of(&self, principal: &Principal) -> Option<usize> {
        self.admins.slot_of(principal)
    }

    /// Total student records, soft-deleted ones included
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    // ---- internals ----

    fn active_student_mut(&mut self, email: &str) -> Result<&mut StudentRecord> {
        match self.students.get_mut(&email.to_string()) {
            Some(record) if record.active => Ok(record),
            _ => Err(RegistryError::not_found(email)),
        }
    }

    pub(crate) fn parts(
        &self,
    ) -> (
        &Principal,
        usize,
        &IndexedRegistry<Principal, ()>,
        &IndexedRegistry<String, StudentRecord>,
    ) {
        (&self.owner, self.admin_limit, &self.admins, &self.students)
    }

    pub(crate) fn from_parts(
        owner: Principal,
        admin_limit: usize,
        admins: IndexedRegistry<Principal, ()>,
        students: IndexedRegistry<String, StudentRecord>,
        sink: Option<Box<dyn ChangeSink>>,
    ) -> Self {
        Self {
            owner,
            admin_limit,
            admins,
            students,
            sink,
        }
    }
}
