//! Cross-generation slot allocation
//!
//! Builds generation *N+1*'s table from generation *N*'s table and the new
//! declaration sequence. Matching is by [`SlotKey`]; everything unmatched is
//! appended, and every previous index the new generation does not claim is
//! carried forward as `Unused` so a suspended frame keeps addressing its
//! values by the same numbers.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::descriptor::{Declaration, KeyExtractor, SlotDescriptor, SlotKey};
use crate::error::{LayoutError, Result};
use crate::slot::{ScopeSpan, SlotIndex, ValueShape};
use crate::table::GenerationTable;

/// Result of allocating one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The new generation's frame layout
    pub table: GenerationTable,
    /// Slot assigned to each declaration, in declaration order
    pub slots: Vec<SlotIndex>,
}

impl Allocation {
    /// Frame size required by this generation, in slots
    pub fn frame_size(&self) -> u32 {
        self.table.frame_size()
    }
}

/// Same-generation free list for scratch slots, keyed by value shape.
///
/// A scratch slot may be shared by transients whose live spans are pairwise
/// disjoint; a transient without span information never shares. Previous
/// generations' scratch slots are never in the pool.
#[derive(Debug, Default)]
struct TransientPool {
    by_shape: FxHashMap<ValueShape, Vec<PoolSlot>>,
}

#[derive(Debug)]
struct PoolSlot {
    index: u32,
    occupants: Vec<ScopeSpan>,
    shareable: bool,
}

impl TransientPool {
    /// Try to place a transient in an existing same-shape slot.
    /// Lowest compatible index wins.
    fn acquire(&mut self, shape: ValueShape, span: Option<ScopeSpan>) -> Option<u32> {
        let span = span?;
        let slots = self.by_shape.get_mut(&shape)?;
        for slot in slots.iter_mut() {
            if slot.shareable && slot.occupants.iter().all(|o| o.is_disjoint(span)) {
                slot.occupants.push(span);
                return Some(slot.index);
            }
        }
        None
    }

    /// Record a freshly appended scratch slot
    fn register(&mut self, shape: ValueShape, index: u32, span: Option<ScopeSpan>) {
        self.by_shape.entry(shape).or_default().push(PoolSlot {
            index,
            shareable: span.is_some(),
            occupants: span.into_iter().collect(),
        });
    }
}

/// Compute the slot layout of one method generation.
///
/// With no `previous` table (first generation) declarations are assigned
/// dense indices in input order. Otherwise each keyed declaration reclaims
/// the previous slot holding the same key, if any, and everything else is
/// appended past the previous table's end. Unclaimed previous indices are
/// retired as `Unused`, so the output length is always `>= previous.len()`.
///
/// Pure and deterministic: equal inputs yield identical allocations.
pub fn allocate(previous: Option<&GenerationTable>, decls: &[Declaration]) -> Result<Allocation> {
    // Derive keys up front; duplicate keys within one generation are an
    // input-contract violation, not something to paper over.
    let mut extractor = KeyExtractor::new();
    let mut extracted = Vec::with_capacity(decls.len());
    let mut seen: FxHashSet<SlotKey> = FxHashSet::default();
    for (index, decl) in decls.iter().enumerate() {
        let (key, descriptor) = extractor.extract(index, decl)?;
        if let Some(key) = &key {
            if !seen.insert(key.clone()) {
                return Err(LayoutError::DuplicateKey(key.clone()));
            }
        }
        extracted.push((key, descriptor, decl.scope));
    }

    let prev_len = previous.map_or(0, GenerationTable::len);

    // Unclaimed previous slots, by key. Retired keys participate: the exact
    // key that once held a slot may revive it.
    let mut unclaimed: FxHashMap<SlotKey, u32> = FxHashMap::default();
    if let Some(previous) = previous {
        for (index, descriptor) in previous.iter() {
            if let Some(key) = descriptor.key() {
                unclaimed.insert(key, index.index());
            }
        }
    }

    let mut reclaimed: Vec<Option<SlotDescriptor>> = vec![None; prev_len];
    let mut appended: Vec<SlotDescriptor> = Vec::new();
    let mut pool = TransientPool::default();
    let mut slots = Vec::with_capacity(decls.len());

    for (position, (key, descriptor, span)) in extracted.into_iter().enumerate() {
        let index = match descriptor {
            SlotDescriptor::Transient { shape } => match pool.acquire(shape, span) {
                Some(index) => index,
                None => {
                    let index = prev_len as u32 + appended.len() as u32;
                    appended.push(descriptor);
                    pool.register(shape, index, span);
                    index
                }
            },
            descriptor => {
                let Some(key) = key else {
                    return Err(LayoutError::MalformedDeclaration {
                        index: position,
                        reason: "long-lived declaration without an identity key",
                    });
                };
                match unclaimed.remove(&key) {
                    Some(index) => {
                        reclaimed[index as usize] = Some(descriptor);
                        index
                    }
                    None => {
                        let index = prev_len as u32 + appended.len() as u32;
                        appended.push(descriptor);
                        index
                    }
                }
            }
        };
        slots.push(SlotIndex::new(index));
    }

    // Carry every unclaimed previous index forward. Keyed slots retire with
    // their key (revivable by that key alone); scratch slots become
    // permanent keyless gaps.
    let mut layout = Vec::with_capacity(prev_len + appended.len());
    if let Some(previous) = previous {
        for (index, prev_descriptor) in previous.iter() {
            match reclaimed[index.index() as usize].take() {
                Some(descriptor) => layout.push(descriptor),
                None => layout.push(SlotDescriptor::Unused {
                    retired: prev_descriptor.retired_key(),
                }),
            }
        }
    }
    layout.extend(appended);

    Ok(Allocation {
        table: GenerationTable::from_slots(layout),
        slots,
    })
}
