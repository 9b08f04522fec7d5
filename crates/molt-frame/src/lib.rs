//! # Molt Frame
//!
//! Slot layout engine for live method patching. Each accepted edit of a
//! method produces a new *generation* of its compiled body; a suspended
//! frame addresses its locals by fixed numeric slot index, so every value
//! that survives the edit must keep its exact index, no index is ever
//! repurposed, and the frame never shrinks.
//!
//! ## Pipeline
//!
//! 1. The front end supplies an ordered [`Declaration`] sequence per
//!    generation (and the previous generation's [`GenerationTable`], if any)
//! 2. [`allocate`] matches declarations to previous slots by [`SlotKey`]
//!    and appends fresh slots for everything unmatched
//! 3. The resulting table is serialized into the method's debug information
//!    and fed back as the "previous table" of the next edit

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod slot;
pub mod table;

pub use allocator::{Allocation, allocate};
pub use descriptor::{Declaration, KeyExtractor, SlotDescriptor, SlotKey};
pub use error::{LayoutError, Result};
pub use slot::{ScopeSpan, SlotIndex, SynthesizedPurpose, ValueShape};
pub use table::GenerationTable;

/// Version of the persisted slot table encoding
pub const TABLE_VERSION: u32 = 1;

/// Header tag for the persisted slot table encoding
pub const TABLE_MAGIC: &str = "MOLTTAB";
