//! Slot indices, anchors and shape categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into a method invocation's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// Create a new slot index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for SlotIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.0)
    }
}

/// Half-open source region `[start, end)` in which a value is live.
///
/// Offsets are in the coordinate space the front end has already normalized
/// against the previous generation, so equal spans mean the same lexical
/// region across an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeSpan {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl ScopeSpan {
    /// Create a new span
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Check whether two spans share no offset
    #[inline]
    pub const fn is_disjoint(self, other: ScopeSpan) -> bool {
        self.end <= other.start || other.end <= self.start
    }
}

impl fmt::Display for ScopeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Fixed enumeration of compiler-synthesized temporary purposes.
///
/// The purpose is part of a synthesized slot's identity: two temporaries of
/// different purposes never share a slot, even when their anchors coincide,
/// because a suspended frame would reinterpret the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynthesizedPurpose {
    /// Enumerator handle of an element-wise loop
    EnumeratorHandle,
    /// Evaluated target of a lock statement
    LockTarget,
    /// Lock-taken flag paired with [`Self::LockTarget`]
    LockTaken,
    /// Resource handle of a scoped-disposal construct
    ResourceHandle,
    /// Pinned-pointer holder
    PinnedPointer,
    /// Dispatch cache of a multi-way branch
    SwitchDispatchCache,
    /// Cached upper bound of one array dimension
    ArrayBoundCache,
    /// Index cursor of one array dimension
    ArrayIndexCache,
    /// Loop continuation flag
    LoopConditionFlag,
}

impl SynthesizedPurpose {
    /// Stable tag used by the persisted table encoding
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnumeratorHandle => "enumerator",
            Self::LockTarget => "lock-target",
            Self::LockTaken => "lock-taken",
            Self::ResourceHandle => "resource",
            Self::PinnedPointer => "pinned",
            Self::SwitchDispatchCache => "switch-cache",
            Self::ArrayBoundCache => "array-bound",
            Self::ArrayIndexCache => "array-index",
            Self::LoopConditionFlag => "loop-flag",
        }
    }

    /// Parse a tag produced by [`Self::tag`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "enumerator" => Self::EnumeratorHandle,
            "lock-target" => Self::LockTarget,
            "lock-taken" => Self::LockTaken,
            "resource" => Self::ResourceHandle,
            "pinned" => Self::PinnedPointer,
            "switch-cache" => Self::SwitchDispatchCache,
            "array-bound" => Self::ArrayBoundCache,
            "array-index" => Self::ArrayIndexCache,
            "loop-flag" => Self::LoopConditionFlag,
            _ => return None,
        })
    }
}

impl fmt::Display for SynthesizedPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Coarse value-shape category for scratch temporaries.
///
/// Two unrelated scratch spills of the same shape may share a slot within
/// one generation; the shape is the free-list key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueShape {
    /// Machine word (integers, booleans, enums)
    #[default]
    Word,
    /// Double-width integer
    Wide,
    /// Floating point
    Float,
    /// Managed reference
    Reference,
    /// Unmanaged pointer
    Pointer,
}

impl ValueShape {
    /// Stable tag used by the persisted table encoding
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Wide => "wide",
            Self::Float => "float",
            Self::Reference => "ref",
            Self::Pointer => "ptr",
        }
    }

    /// Parse a tag produced by [`Self::tag`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "word" => Self::Word,
            "wide" => Self::Wide,
            "float" => Self::Float,
            "ref" => Self::Reference,
            "ptr" => Self::Pointer,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index() {
        let s = SlotIndex::new(7);
        assert_eq!(s.index(), 7);
        assert_eq!(s.to_string(), "V_7");
    }

    #[test]
    fn test_span_disjoint() {
        let a = ScopeSpan::new(0, 10);
        let b = ScopeSpan::new(10, 20);
        let c = ScopeSpan::new(5, 15);
        assert!(a.is_disjoint(b));
        assert!(b.is_disjoint(a));
        assert!(!a.is_disjoint(c));
        assert!(!c.is_disjoint(b));
    }

    #[test]
    fn test_purpose_tag_roundtrip() {
        for p in [
            SynthesizedPurpose::EnumeratorHandle,
            SynthesizedPurpose::LockTarget,
            SynthesizedPurpose::LockTaken,
            SynthesizedPurpose::ResourceHandle,
            SynthesizedPurpose::PinnedPointer,
            SynthesizedPurpose::SwitchDispatchCache,
            SynthesizedPurpose::ArrayBoundCache,
            SynthesizedPurpose::ArrayIndexCache,
            SynthesizedPurpose::LoopConditionFlag,
        ] {
            assert_eq!(SynthesizedPurpose::from_tag(p.tag()), Some(p));
        }
        assert_eq!(SynthesizedPurpose::from_tag("bogus"), None);
    }

    #[test]
    fn test_shape_tag_roundtrip() {
        for s in [
            ValueShape::Word,
            ValueShape::Wide,
            ValueShape::Float,
            ValueShape::Reference,
            ValueShape::Pointer,
        ] {
            assert_eq!(ValueShape::from_tag(s.tag()), Some(s));
        }
    }
}
