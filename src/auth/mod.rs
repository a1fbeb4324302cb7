//! Roles and operation gating for registry mutations
//!
//! Every mutating operation names itself here and declares the role it
//! requires. The service resolves the caller's role from its own state and
//! checks it against this table before touching anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles a caller can hold, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Role {
    /// Authorized administrator - student and assignment mutations
    Admin = 1,
    /// Registry owner - admin roster and ownership changes
    Owner = 2,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Owner => write!(f, "OWNER"),
        }
    }
}

/// Mutating operations exposed at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddAdmin,
    RemoveAdmin,
    SetAdminLimit,
    TransferOwnership,
    AddStudent,
    RemoveStudent,
    UpdateStudentName,
    UpdateStudentCommendation,
    UpdateStudentGrade,
    UpdateStudentEmail,
    AddAssignment,
    UpdateAssignmentStatus,
}

impl Operation {
    /// Role required to perform this operation.
    ///
    /// Admin-roster changes (including the admin ceiling) are owner-only;
    /// student and assignment mutations need any authorized admin.
    pub fn required_role(&self) -> Role {
        match self {
            Operation::AddAdmin
            | Operation::RemoveAdmin
            | Operation::SetAdminLimit
            | Operation::TransferOwnership => Role::Owner,

            Operation::AddStudent
            | Operation::RemoveStudent
            | Operation::UpdateStudentName
            | Operation::UpdateStudentCommendation
            | Operation::UpdateStudentGrade
            | Operation::UpdateStudentEmail
            | Operation::AddAssignment
            | Operation::UpdateAssignmentStatus => Role::Admin,
        }
    }

    /// Stable operation name for logging and change records
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddAdmin => "add_admin",
            Operation::RemoveAdmin => "remove_admin",
            Operation::SetAdminLimit => "set_admin_limit",
            Operation::TransferOwnership => "transfer_ownership",
            Operation::AddStudent => "add_student",
            Operation::RemoveStudent => "remove_student",
            Operation::UpdateStudentName => "update_student_name",
            Operation::UpdateStudentCommendation => "update_student_commendation",
            Operation::UpdateStudentGrade => "update_student_grade",
            Operation::UpdateStudentEmail => "update_student_email",
            Operation::AddAssignment => "add_assignment",
            Operation::UpdateAssignmentStatus => "update_assignment_status",
        }
    }
}

/// Check whether a held role satisfies an operation's requirement.
/// `None` means the caller holds no role at all and is always rejected.
pub fn is_operation_allowed(operation: Operation, held: Option<Role>) -> bool {
    match held {
        Some(role) => role >= operation.required_role(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_operations() {
        assert!(is_operation_allowed(Operation::AddStudent, Some(Role::Admin)));
        assert!(is_operation_allowed(Operation::AddStudent, Some(Role::Owner)));
        assert!(!is_operation_allowed(Operation::AddStudent, None));
    }

    #[test]
    fn test_owner_operations() {
        assert!(!is_operation_allowed(Operation::AddAdmin, Some(Role::Admin)));
        assert!(is_operation_allowed(Operation::AddAdmin, Some(Role::Owner)));
        assert!(!is_operation_allowed(
            Operation::TransferOwnership,
            Some(Role::Admin)
        ));
    }

    #[test]
    fn test_admin_limit_is_owner_gated() {
        // Deliberately stricter than the ungated original
        assert_eq!(Operation::SetAdminLimit.required_role(), Role::Owner);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Owner > Role::Admin);
    }
}
