//! Slot allocation for the Group/Object tree
//!
//! Slots double as submission addresses (`groups[g][objects][o]`), so they
//! are handed out from monotonic counters and never reused within a session:
//! - group slots come from one counter
//! - each live group owns its own object counter
//! - removal never decrements or compacts a counter
//!
//! Only [`IndexAllocator::reset`] rewinds, and only rehydration calls it.

use crate::error::{FormError, FormResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Address of a Group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupSlot(u32);

impl GroupSlot {
    /// Wrap a raw slot value
    #[inline]
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Raw slot value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GroupSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "groups[{}]", self.0)
    }
}

/// Address of an Object within its Group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectSlot(u32);

impl ObjectSlot {
    /// Wrap a raw slot value
    #[inline]
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Raw slot value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Globally distinct address of a live Object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectPath {
    /// Owning group
    pub group: GroupSlot,
    /// Slot within the group
    pub object: ObjectSlot,
}

impl ObjectPath {
    /// Create path
    #[inline]
    #[must_use]
    pub const fn new(group: GroupSlot, object: ObjectSlot) -> Self {
        Self { group, object }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[objects][{}]", self.group, self.object.0)
    }
}

/// Two-level monotonic slot counters
#[derive(Debug, Clone, Default)]
pub struct IndexAllocator {
    next_group: u32,
    next_object: BTreeMap<GroupSlot, u32>,
}

impl IndexAllocator {
    /// Create allocator with both counters at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next group slot and open its object counter
    pub fn next_group_slot(&mut self) -> GroupSlot {
        let slot = GroupSlot(self.next_group);
        self.next_group += 1;
        self.next_object.insert(slot, 0);
        slot
    }

    /// Allocate the next object slot within `group`
    ///
    /// # Errors
    /// `FormError::UnknownGroup` if `group` was never allocated or has been released
    pub fn next_object_slot(&mut self, group: GroupSlot) -> FormResult<ObjectSlot> {
        let counter = self
            .next_object
            .get_mut(&group)
            .ok_or(FormError::UnknownGroup(group))?;
        let slot = ObjectSlot(*counter);
        *counter += 1;
        Ok(slot)
    }

    /// Drop a group's object counter; its object slots are never revisited
    ///
    /// Returns whether the group was open.
    pub fn release_group(&mut self, group: GroupSlot) -> bool {
        self.next_object.remove(&group).is_some()
    }

    /// Rewind both counters to zero
    pub fn reset(&mut self) {
        self.next_group = 0;
        self.next_object.clear();
    }

    /// Value the next group slot will take
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> u32 {
        self.next_group
    }

    /// Value the next object slot of `group` will take, `None` if not open
    #[inline]
    #[must_use]
    pub fn object_count(&self, group: GroupSlot) -> Option<u32> {
        self.next_object.get(&group).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_slots_increase() {
        let mut alloc = IndexAllocator::new();
        let a = alloc.next_group_slot();
        let b = alloc.next_group_slot();
        assert_eq!((a.get(), b.get()), (0, 1));
        assert_eq!(alloc.group_count(), 2);
    }

    #[test]
    fn object_counters_are_per_group() {
        let mut alloc = IndexAllocator::new();
        let g0 = alloc.next_group_slot();
        let g1 = alloc.next_group_slot();

        assert_eq!(alloc.next_object_slot(g0).unwrap().get(), 0);
        assert_eq!(alloc.next_object_slot(g0).unwrap().get(), 1);
        assert_eq!(alloc.next_object_slot(g1).unwrap().get(), 0);
        assert_eq!(alloc.object_count(g0), Some(2));
    }

    #[test]
    fn released_group_rejects_objects_and_slot_is_not_reused() {
        let mut alloc = IndexAllocator::new();
        let g0 = alloc.next_group_slot();
        assert!(alloc.release_group(g0));
        assert!(!alloc.release_group(g0));

        assert_eq!(alloc.next_object_slot(g0), Err(FormError::UnknownGroup(g0)));
        assert_eq!(alloc.next_group_slot().get(), 1);
    }

    #[test]
    fn reset_rewinds() {
        let mut alloc = IndexAllocator::new();
        let g = alloc.next_group_slot();
        alloc.next_object_slot(g).unwrap();
        alloc.reset();

        assert_eq!(alloc.group_count(), 0);
        assert_eq!(alloc.object_count(g), None);
        assert_eq!(alloc.next_group_slot(), GroupSlot::new(0));
    }

    #[test]
    fn path_display() {
        let path = ObjectPath::new(GroupSlot::new(3), ObjectSlot::new(7));
        assert_eq!(path.to_string(), "groups[3][objects][7]");
    }
}
