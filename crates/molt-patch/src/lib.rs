//! # Molt Patch
//!
//! Composition layer for live method patching: drives the slot allocator
//! and the stepping-marker planner for one method, generation by
//! generation, and enforces the relocation-target agreement between them.
//! Rejected edits leave the chain untouched.
//!
//! Independent methods never share state; chains for different methods may
//! be driven fully in parallel. Edits to *one* method must be applied in
//! order, since each generation consumes the previous generation's table.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chain;
pub mod error;

pub use chain::{Generation, GenerationChain, MethodEdit};
pub use error::{PatchError, Result};
