//! Stepping-marker placement

use serde::{Deserialize, Serialize};

use crate::skeleton::{ResumePoint, SourceSpan};

/// One position marker in a generation's instruction stream.
///
/// A marker without a span is hidden: it exists only for instruction-pointer
/// relocation and is never shown to a user stepping through source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Instruction offset
    pub offset: u32,
    /// Mapped source region, or `None` for a hidden marker
    pub span: Option<SourceSpan>,
}

impl Marker {
    /// A source-mapped stepping marker
    pub const fn stepping(offset: u32, span: SourceSpan) -> Self {
        Self {
            offset,
            span: Some(span),
        }
    }

    /// A hidden relocation-only marker
    pub const fn hidden(offset: u32) -> Self {
        Self { offset, span: None }
    }

    /// Whether this marker is hidden
    pub const fn is_hidden(&self) -> bool {
        self.span.is_none()
    }
}

/// Offset-ordered marker list for one generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    markers: Vec<Marker>,
}

impl Markers {
    /// Number of markers
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterate markers in offset order
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Nearest marker at or before `offset`: the relocation landing point
    /// for an instruction pointer suspended at `offset`.
    pub fn at_or_before(&self, offset: u32) -> Option<&Marker> {
        match self.markers.binary_search_by_key(&offset, |m| m.offset) {
            Ok(i) => {
                // Several markers may share the offset; take the first.
                let first = self.markers[..i]
                    .iter()
                    .rposition(|m| m.offset != offset)
                    .map_or(0, |p| p + 1);
                Some(&self.markers[first])
            }
            Err(0) => None,
            Err(i) => Some(&self.markers[i - 1]),
        }
    }
}

/// Plan the marker set for one generation.
///
/// `statements` supplies the normal source-mapped stepping markers as
/// `(instruction offset, source span)` pairs; `skeleton` supplies the
/// resumable re-entry points, each of which gets a hidden marker at its
/// re-entry offset. The output is sorted by offset (hidden before stepping
/// at equal offsets, for deterministic output); duplicate hidden markers at
/// one offset collapse to one.
pub fn plan(statements: &[(u32, SourceSpan)], skeleton: &[ResumePoint]) -> Markers {
    let mut markers: Vec<Marker> = Vec::with_capacity(statements.len() + skeleton.len());
    markers.extend(
        statements
            .iter()
            .map(|&(offset, span)| Marker::stepping(offset, span)),
    );
    markers.extend(skeleton.iter().map(|p| Marker::hidden(p.offset)));

    markers.sort_by_key(|m| (m.offset, !m.is_hidden()));
    markers.dedup_by(|a, b| a.offset == b.offset && a.is_hidden() && b.is_hidden());

    Markers { markers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::ResumeKind;

    fn span(start: u32) -> SourceSpan {
        SourceSpan::new(start, start + 5)
    }

    #[test]
    fn test_markers_are_offset_ordered() {
        let statements = [(0x20, span(30)), (0x00, span(0)), (0x10, span(10))];
        let skeleton = [
            ResumePoint::new(ResumeKind::LoopCondition, 10, 0x18),
            ResumePoint::new(ResumeKind::CleanupEntry, 30, 0x08),
        ];
        let markers = plan(&statements, &skeleton);
        let offsets: Vec<u32> = markers.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0x00, 0x08, 0x10, 0x18, 0x20]);
        assert!(markers.iter().filter(|m| m.is_hidden()).count() == 2);
    }

    #[test]
    fn test_hidden_marker_separate_from_body_statement() {
        // Loop re-entry must be addressable separately from the loop body's
        // first statement, even when both exist.
        let statements = [(0x05, span(37)), (0x12, span(25))];
        let skeleton = [ResumePoint::new(ResumeKind::LoopCondition, 8, 0x12)];
        let markers = plan(&statements, &skeleton);
        assert_eq!(markers.len(), 3);
        let at_12: Vec<&Marker> = markers.iter().filter(|m| m.offset == 0x12).collect();
        assert_eq!(at_12.len(), 2);
        assert!(at_12[0].is_hidden());
        assert!(!at_12[1].is_hidden());
    }

    #[test]
    fn test_duplicate_hidden_markers_collapse() {
        // Two constructs resuming at one offset need only one hidden entry.
        let skeleton = [
            ResumePoint::new(ResumeKind::LoopCondition, 8, 0x12),
            ResumePoint::new(ResumeKind::DispatchTable, 40, 0x12),
        ];
        let markers = plan(&[], &skeleton);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers.iter().next(), Some(&Marker::hidden(0x12)));
    }

    #[test]
    fn test_at_or_before() {
        let statements = [(0x00, span(0)), (0x10, span(10))];
        let skeleton = [ResumePoint::new(ResumeKind::LoopCondition, 8, 0x08)];
        let markers = plan(&statements, &skeleton);

        assert_eq!(markers.at_or_before(0x0c), Some(&Marker::hidden(0x08)));
        assert_eq!(
            markers.at_or_before(0x10),
            Some(&Marker::stepping(0x10, span(10)))
        );
        assert_eq!(
            markers.at_or_before(0xff),
            Some(&Marker::stepping(0x10, span(10)))
        );
        assert!(plan(&[], &[]).at_or_before(0x00).is_none());
    }

    #[test]
    fn test_empty_plan() {
        let markers = plan(&[], &[]);
        assert!(markers.is_empty());
    }
}
