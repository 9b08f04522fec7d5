//! Generation slot table

use serde::{Deserialize, Serialize};

use crate::descriptor::{SlotDescriptor, SlotKey};
use crate::slot::SlotIndex;

/// One generation's frame layout: an ordered, dense sequence of slot
/// descriptors, index = slot number.
///
/// Tables are immutable once built. The allocator builds generation *N+1*'s
/// table from generation *N*'s; across that chain the length never
/// decreases and an index, once given a meaning, is never repurposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTable {
    slots: Vec<SlotDescriptor>,
}

impl GenerationTable {
    /// Create an empty table (a method with no locals)
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_slots(slots: Vec<SlotDescriptor>) -> Self {
        Self { slots }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Frame size required by this generation, in slots
    pub fn frame_size(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Descriptor at `index`, if the index is in range
    pub fn get(&self, index: SlotIndex) -> Option<&SlotDescriptor> {
        self.slots.get(index.index() as usize)
    }

    /// Iterate descriptors in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &SlotDescriptor)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, d)| (SlotIndex::new(i as u32), d))
    }

    /// Find the slot currently holding `key`, live or retired
    pub fn slot_for_key(&self, key: &SlotKey) -> Option<SlotIndex> {
        self.iter()
            .find(|(_, d)| d.key().as_ref() == Some(key))
            .map(|(i, _)| i)
    }
}

impl std::ops::Index<SlotIndex> for GenerationTable {
    type Output = SlotDescriptor;

    fn index(&self, index: SlotIndex) -> &SlotDescriptor {
        &self.slots[index.index() as usize]
    }
}
