//! Per-student assignment ledger
//!
//! Assignments are keyed by a u16 slot. Slot 0 is permanently reserved for
//! the final project; regular assignments are numbered by a monotonically
//! increasing counter starting at 1. Slots are never reclaimed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{RegistryError, Result};

/// Status of an assignment.
///
/// Transitions are unrestricted: the enum documents intent, it does not
/// enforce a state machine. Callers own meaningful progressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Inactive,
    Pending,
    Completed,
    Cancelled,
}

/// A single assignment entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Assignment {
    /// Link to the assignment material or submission
    pub link: String,
    pub status: AssignmentStatus,
}

/// Append-only assignment collection for one student.
///
/// The counter only ever moves forward; interleaved final-project writes
/// never disturb regular slot numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLedger {
    counter: u16,
    slots: BTreeMap<u16, Assignment>,
}

/// Reserved slot for the final project
pub const FINAL_PROJECT_SLOT: u16 = 0;

impl AssignmentLedger {
    pub fn new() -> Self {
        let mut slots = BTreeMap::new();
        // The reserved slot is always readable, even before any write.
        slots.insert(FINAL_PROJECT_SLOT, Assignment::default());
        Self { counter: 0, slots }
    }

    /// Highest regular slot allocated so far (0 when none)
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Allocate the slot for a new assignment.
    ///
    /// The final project always lands in slot 0 and leaves the counter
    /// alone; anything else takes the next counter value.
    pub fn allocate_slot(&mut self, is_final_project: bool) -> Result<u16> {
        if is_final_project {
            return Ok(FINAL_PROJECT_SLOT);
        }
        let next = self
            .counter
            .checked_add(1)
            .ok_or_else(|| RegistryError::limit_exceeded("assignment counter at u16::MAX"))?;
        self.counter = next;
        Ok(next)
    }

    /// Slot addressed by status updates: the final project or the most
    /// recently allocated regular slot.
    pub fn latest_slot(&self, is_final_project: bool) -> Result<u16> {
        if is_final_project {
            return Ok(FINAL_PROJECT_SLOT);
        }
        if self.counter == 0 {
            // No regular assignment yet; slot 0 belongs to the final project.
            return Err(RegistryError::InvalidSlot { slot: 0 });
        }
        Ok(self.counter)
    }

    /// Upsert the assignment at a slot
    pub fn write(&mut self, slot: u16, link: String, status: AssignmentStatus) {
        self.slots.insert(slot, Assignment { link, status });
    }

    /// Overwrite only the status at a slot, keeping the link
    pub fn write_status(&mut self, slot: u16, status: AssignmentStatus) {
        self.slots.entry(slot).or_default().status = status;
    }

    /// Read the assignment at a slot.
    ///
    /// Slot 0 is always valid; regular slots are valid up to the counter.
    pub fn read(&self, slot: u16) -> Result<&Assignment> {
        if slot > self.counter {
            return Err(RegistryError::InvalidSlot { slot });
        }
        self.slots
            .get(&slot)
            .ok_or(RegistryError::InvalidSlot { slot })
    }

    /// Iterate written assignments in slot order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Assignment)> {
        self.slots.iter().map(|(&slot, a)| (slot, a))
    }
}

impl Default for AssignmentLedger {
    fn default() -> Self {
        Self::new()
    }
}
