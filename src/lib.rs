//! Rollbook - in-memory registry for administrators, students, and assignments
//!
//! Rollbook tracks three related entity sets under role-gated mutation:
//! administrators (dense index with swap-compaction delete), students
//! (email-keyed, soft-deleted), and per-student assignments (append-only
//! u16 slots with slot 0 reserved for the final project).
//!
//! ## Modules
//!
//! - **Index**: dense slot storage with a reverse key map kept bit-for-bit
//!   consistent across insert, swap-delete, and rekey
//! - **Assignments**: per-student append-only ledger with the two-mode
//!   counter scheme
//! - **Auth**: ordered roles and the operation whitelist consulted before
//!   every mutation
//! - **Events**: structured change records emitted after each successful
//!   mutation, with JSONL and in-memory sinks
//! - **Service**: the `Rollbook` registry service composing all of the above

pub mod assignments;
pub mod auth;
pub mod config;
pub mod events;
pub mod index;
pub mod service;
pub mod students;
pub mod types;

pub use assignments::{Assignment, AssignmentStatus, FINAL_PROJECT_SLOT};
pub use config::RollbookConfig;
pub use events::{ChangeRecord, ChangeSink, JsonlChangeSink, MemoryChangeSink};
pub use service::{Rollbook, RollbookSnapshot, SharedRollbook};
pub use students::{Commendation, Grade, StudentRecord};
pub use types::{Principal, RegistryError, Result};
