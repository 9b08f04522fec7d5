//! Per-method generation chain

use tracing::{debug, trace};

use molt_frame::{Declaration, GenerationTable, SlotIndex, allocate};
use molt_markers::{Markers, ResumePoint, SourceSpan, check_relocation, plan};

use crate::error::Result;

/// Front-end input for one generation of one method
#[derive(Debug, Clone, Default)]
pub struct MethodEdit {
    /// Ordered local/temporary declaration sequence
    pub declarations: Vec<Declaration>,
    /// Source-mapped statements: `(instruction offset, source span)`
    pub statements: Vec<(u32, SourceSpan)>,
    /// Resumable re-entry points of the control-flow skeleton
    pub resume_points: Vec<ResumePoint>,
}

/// One accepted generation of a method's compiled body
#[derive(Debug, Clone)]
pub struct Generation {
    /// Frame layout
    pub table: GenerationTable,
    /// Slot assigned to each declaration, in declaration order
    pub slots: Vec<SlotIndex>,
    /// Stepping and hidden markers, ordered by offset
    pub markers: Markers,
    /// Resume points, kept to validate the next edit against
    pub resume_points: Vec<ResumePoint>,
}

impl Generation {
    /// Frame size required by this generation, in slots
    pub fn frame_size(&self) -> u32 {
        self.table.frame_size()
    }
}

/// The accepted generations of one method, oldest first.
///
/// Each [`apply`](Self::apply) consumes the latest table as the allocator's
/// previous input; a rejected or invalid edit leaves the chain exactly as
/// it was.
#[derive(Debug, Default)]
pub struct GenerationChain {
    method: String,
    generations: Vec<Generation>,
}

impl GenerationChain {
    /// Create an empty chain for the named method
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            generations: Vec::new(),
        }
    }

    /// Method name this chain belongs to
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Number of accepted generations
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// Whether no generation has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Latest accepted generation
    pub fn current(&self) -> Option<&Generation> {
        self.generations.last()
    }

    /// Generation by number (0 = the original compilation)
    pub fn generation(&self, number: usize) -> Option<&Generation> {
        self.generations.get(number)
    }

    /// Apply one edit, producing the next generation.
    ///
    /// The relocation check runs first: every resumable construct of the
    /// current generation must have a counterpart in the edit, otherwise a
    /// suspended frame could not be relocated and the edit is rejected.
    pub fn apply(&mut self, edit: MethodEdit) -> Result<&Generation> {
        let previous = self.generations.last();

        if let Some(previous) = previous {
            if let Err(unmatched) = check_relocation(&previous.resume_points, &edit.resume_points)
            {
                debug!(
                    method = %self.method,
                    generation = self.generations.len(),
                    %unmatched,
                    "edit rejected"
                );
                return Err(unmatched.into());
            }
        }

        let allocation = allocate(previous.map(|g| &g.table), &edit.declarations)?;
        let markers = plan(&edit.statements, &edit.resume_points);

        debug!(
            method = %self.method,
            generation = self.generations.len(),
            frame_size = allocation.frame_size(),
            grown_by = allocation.frame_size()
                - previous.map_or(0, |g| g.frame_size()),
            "generation accepted"
        );
        trace!(table = %allocation.table.encode());

        self.generations.push(Generation {
            table: allocation.table,
            slots: allocation.slots,
            markers,
            resume_points: edit.resume_points,
        });
        // Just pushed, so the chain is non-empty.
        Ok(&self.generations[self.generations.len() - 1])
    }
}
