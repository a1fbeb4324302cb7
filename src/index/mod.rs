//! Dense slot index with reverse key mapping
//!
//! The primary storage is a dense vector indexed by slot; the reverse map
//! resolves an external key to its current slot. Both structures are only
//! ever touched together, inside this module, so the bidirectional
//! invariant `keys[reverse[k]] == k` holds at every observable point.
//!
//! Deletion uses swap-compaction: the last entry is moved into the vacated
//! slot and the tail is popped, so removal is O(1) and slots stay dense.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{RegistryError, Result};

/// Dense registry of values keyed by an external key.
///
/// Slots are assigned sequentially on insert. A removed entry's slot is
/// immediately reoccupied by the entry that was last, so `0..len()` is
/// always fully populated. Callers must not assume a key keeps its slot
/// across removals of other keys.
#[derive(Debug, Clone)]
pub struct IndexedRegistry<K, V> {
    /// Slot-ordered keys; `keys[slot]` is the key occupying `slot`
    keys: Vec<K>,
    /// Slot-ordered values, parallel to `keys`
    values: Vec<V>,
    /// Reverse map: key -> current slot
    reverse: HashMap<K, usize>,
}

impl<K, V> IndexedRegistry<K, V>
where
    K: Clone + Eq + Hash + ToString,
{
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            reverse: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.reverse.contains_key(key)
    }

    /// Current slot of a key, if registered
    pub fn slot_of(&self, key: &K) -> Option<usize> {
        self.reverse.get(key).copied()
    }

    /// Key occupying a slot, if any
    pub fn key_at(&self, slot: usize) -> Option<&K> {
        self.keys.get(slot)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.reverse.get(key).map(|&slot| &self.values[slot])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.reverse.get(key)?;
        Some(&mut self.values[slot])
    }

    /// Append a new entry, returning its slot.
    ///
    /// Fails if the key is already registered; the caller decides whether
    /// "already registered" means anything softer (e.g. reactivation).
    pub fn insert(&mut self, key: K, value: V) -> Result<usize> {
        if self.reverse.contains_key(&key) {
            return Err(RegistryError::already_exists(key.to_string()));
        }
        let slot = self.keys.len();
        self.reverse.insert(key.clone(), slot);
        self.keys.push(key);
        self.values.push(value);
        Ok(slot)
    }

    /// Remove an entry by key via swap-compaction, returning its value.
    ///
    /// The entry occupying the last slot is moved into the removed entry's
    /// slot and its reverse entry is repointed. Removing the last-inserted
    /// entry skips the repoint to avoid self-aliasing.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let removed_slot = self
            .reverse
            .remove(key)
            .ok_or_else(|| RegistryError::not_found(key.to_string()))?;
        let last_slot = self.keys.len() - 1;

        if removed_slot != last_slot {
            let last_key = self.keys[last_slot].clone();
            self.reverse.insert(last_key, removed_slot);
        }
        // swap_remove moves the last element into the vacated slot
        self.keys.swap_remove(removed_slot);
        Ok(self.values.swap_remove(removed_slot))
    }

    /// Atomically move an entry from one key to another.
    ///
    /// The slot and value are untouched; only the key and its reverse entry
    /// change. Fails without mutating if `old` is absent or `new` is taken.
    pub fn rekey(&mut self, old: &K, new: K) -> Result<()> {
        if self.reverse.contains_key(&new) {
            return Err(RegistryError::already_exists(new.to_string()));
        }
        let slot = self
            .reverse
            .remove(old)
            .ok_or_else(|| RegistryError::not_found(old.to_string()))?;
        self.keys[slot] = new.clone();
        self.reverse.insert(new, slot);
        Ok(())
    }

    /// Iterate entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }
}

impl<K, V> Default for IndexedRegistry<K, V>
where
    K: Clone + Eq + Hash + ToString,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_consistency(reg: &IndexedRegistry<String, u32>) {
        assert_eq!(reg.keys.len(), reg.values.len());
        assert_eq!(reg.keys.len(), reg.reverse.len());
        for (key, &slot) in &reg.reverse {
            assert_eq!(reg.keys[slot], *key, "reverse entry out of sync");
        }
    }

    fn filled(keys: &[&str]) -> IndexedRegistry<String, u32> {
        let mut reg = IndexedRegistry::new();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(reg.insert(key.to_string(), i as u32).unwrap(), i);
        }
        reg
    }

    #[test]
    fn test_insert_assigns_sequential_slots() {
        let reg = filled(&["a", "b", "c"]);
        assert_eq!(reg.slot_of(&"a".to_string()), Some(0));
        assert_eq!(reg.slot_of(&"c".to_string()), Some(2));
        assert_eq!(reg.key_at(1), Some(&"b".to_string()));
        check_consistency(&reg);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut reg = filled(&["a"]);
        let err = reg.insert("a".to_string(), 9).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyExists {
                key: "a".to_string()
            }
        );
        assert_eq!(reg.get(&"a".to_string()), Some(&0));
    }

    #[test]
    fn test_remove_middle_repoints_last() {
        let mut reg = filled(&["a", "b", "c"]);
        assert_eq!(reg.remove(&"a".to_string()).unwrap(), 0);
        // c was last and now occupies a's slot
        assert_eq!(reg.slot_of(&"c".to_string()), Some(0));
        assert_eq!(reg.get(&"c".to_string()), Some(&2));
        assert_eq!(reg.len(), 2);
        check_consistency(&reg);
    }

    #[test]
    fn test_remove_last_inserted_skips_repoint() {
        let mut reg = filled(&["a", "b", "c"]);
        assert_eq!(reg.remove(&"c".to_string()).unwrap(), 2);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.slot_of(&"a".to_string()), Some(0));
        assert_eq!(reg.slot_of(&"b".to_string()), Some(1));
        assert!(!reg.contains_key(&"c".to_string()));
        check_consistency(&reg);
    }

    #[test]
    fn test_remove_only_entry() {
        let mut reg = filled(&["a"]);
        assert_eq!(reg.remove(&"a".to_string()).unwrap(), 0);
        assert!(reg.is_empty());
        check_consistency(&reg);
    }

    #[test]
    fn test_remove_unknown_key() {
        let mut reg = filled(&["a"]);
        let err = reg.remove(&"zzz".to_string()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotFound {
                key: "zzz".to_string()
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_readd_previously_removed_key() {
        let mut reg = filled(&["a", "b"]);
        reg.remove(&"a".to_string()).unwrap();
        let slot = reg.insert("a".to_string(), 7).unwrap();
        assert_eq!(slot, 1);
        assert_eq!(reg.get(&"a".to_string()), Some(&7));
        check_consistency(&reg);
    }

    #[test]
    fn test_consistency_under_mixed_ops() {
        let mut reg = IndexedRegistry::new();
        for i in 0..8u32 {
            reg.insert(format!("k{}", i), i).unwrap();
        }
        for key in ["k3", "k0", "k7", "k5"] {
            reg.remove(&key.to_string()).unwrap();
            check_consistency(&reg);
        }
        reg.insert("k3".to_string(), 33).unwrap();
        check_consistency(&reg);
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn test_rekey_keeps_slot_and_value() {
        let mut reg = filled(&["a", "b"]);
        reg.rekey(&"a".to_string(), "z".to_string()).unwrap();
        assert_eq!(reg.slot_of(&"z".to_string()), Some(0));
        assert_eq!(reg.get(&"z".to_string()), Some(&0));
        assert!(!reg.contains_key(&"a".to_string()));
        check_consistency(&reg);
    }

    #[test]
    fn test_rekey_onto_taken_key_is_untouched() {
        let mut reg = filled(&["a", "b"]);
        let err = reg.rekey(&"a".to_string(), "b".to_string()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyExists {
                key: "b".to_string()
            }
        );
        assert_eq!(reg.slot_of(&"a".to_string()), Some(0));
        assert_eq!(reg.slot_of(&"b".to_string()), Some(1));
        check_consistency(&reg);
    }
}
