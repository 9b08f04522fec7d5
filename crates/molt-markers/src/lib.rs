//! # Molt Markers
//!
//! Stepping-marker planning for live method patching. A live edit changes
//! instruction offsets, so the debugger relocates a suspended instruction
//! pointer by finding the nearest enclosing marker and landing on its
//! counterpart in the new generation. Besides the normal source-mapped
//! stepping markers, every point where control *re-enters* a construct —
//! a loop condition, a cleanup block, a dispatch table — needs its own
//! hidden marker, or relocation would land in the wrong iteration state.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod planner;
pub mod skeleton;

pub use planner::{Marker, Markers, plan};
pub use skeleton::{ResumeKind, ResumePoint, SourceSpan, UnmatchedResumePoint, check_relocation};
