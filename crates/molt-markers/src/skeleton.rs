//! Control-flow skeleton and relocation-target matching

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source region a stepping marker maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl SourceSpan {
    /// Create a new span
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Kind of construct a suspended instruction pointer can re-enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResumeKind {
    /// Back edge into a loop's condition check
    LoopCondition,
    /// Entry of a cleanup block run on the way out of a protected region
    CleanupEntry,
    /// Multi-way-branch dispatch block
    DispatchTable,
}

impl fmt::Display for ResumeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::LoopCondition => "loop-condition",
            Self::CleanupEntry => "cleanup-entry",
            Self::DispatchTable => "dispatch-table",
        };
        f.write_str(tag)
    }
}

/// One resumable re-entry point of a method's control-flow skeleton.
///
/// `anchor` identifies the construct instance (in the coordinate space the
/// front end normalized against the previous generation); `offset` is where
/// the re-entry lands in this generation's instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumePoint {
    /// Construct kind
    pub kind: ResumeKind,
    /// Source offset of the construct instance
    pub anchor: u32,
    /// Instruction offset of the re-entry
    pub offset: u32,
}

impl ResumePoint {
    /// Create a new resume point
    pub const fn new(kind: ResumeKind, anchor: u32, offset: u32) -> Self {
        Self {
            kind,
            anchor,
            offset,
        }
    }
}

/// A resumable construct of the old generation with no counterpart in the
/// new one. A frame suspended inside it could not be relocated, so the
/// caller must reject the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no relocation target for {kind} construct at anchor {anchor} in the new generation")]
pub struct UnmatchedResumePoint {
    /// Construct kind
    pub kind: ResumeKind,
    /// Source offset of the construct instance
    pub anchor: u32,
}

/// Verify that every resumable construct of the old generation has a
/// counterpart (same kind, same anchor) in the new one.
///
/// Instruction offsets are allowed to differ; relocation exists precisely
/// to bridge them. The first unmatched construct is reported.
pub fn check_relocation(
    old: &[ResumePoint],
    new: &[ResumePoint],
) -> Result<(), UnmatchedResumePoint> {
    for point in old {
        let matched = new
            .iter()
            .any(|p| p.kind == point.kind && p.anchor == point.anchor);
        if !matched {
            return Err(UnmatchedResumePoint {
                kind: point.kind,
                anchor: point.anchor,
            });
        }
    }
    Ok(())
}
