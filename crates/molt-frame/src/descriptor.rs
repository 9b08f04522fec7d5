//! Slot descriptors, identity keys and front-end declarations

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::slot::{ScopeSpan, SynthesizedPurpose, ValueShape};

/// Payload recorded at one slot of one generation's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDescriptor {
    /// A source-named variable
    UserLocal {
        /// Source name
        name: String,
        /// Lexical region in which the variable is live
        scope: ScopeSpan,
    },
    /// A compiler-introduced temporary tied to one source construct
    Synthesized {
        /// What the temporary is for
        purpose: SynthesizedPurpose,
        /// Source offset of the construct that introduced it
        anchor: u32,
        /// Position among same-purpose temporaries of the same construct
        ordinal: u16,
    },
    /// Unnamed scratch value with no cross-statement lifetime
    Transient {
        /// Free-list category
        shape: ValueShape,
    },
    /// A slot from an earlier generation not claimed by this one.
    ///
    /// It still occupies its index so the frame never shrinks. `retired`
    /// keeps the key it once held; only that exact key may reclaim the
    /// index in a later generation. Retired scratch slots carry no key and
    /// stay dead forever.
    Unused {
        /// Key the slot held before it was retired, if any
        retired: Option<SlotKey>,
    },
}

impl SlotDescriptor {
    /// Key under which this descriptor matches across generations.
    ///
    /// `Transient` and keyless `Unused` descriptors are never matched.
    pub fn key(&self) -> Option<SlotKey> {
        match self {
            Self::UserLocal { name, scope } => Some(SlotKey::User {
                name: name.clone(),
                scope_start: scope.start,
            }),
            Self::Synthesized {
                purpose,
                anchor,
                ordinal,
            } => Some(SlotKey::Purposed {
                purpose: *purpose,
                anchor: *anchor,
                ordinal: *ordinal,
            }),
            Self::Transient { .. } => None,
            Self::Unused { retired } => retired.clone(),
        }
    }

    /// Key to remember when this slot is carried forward unclaimed
    pub(crate) fn retired_key(&self) -> Option<SlotKey> {
        match self {
            Self::Transient { .. } => None,
            other => other.key(),
        }
    }
}

/// Identity of a long-lived slot, stable across generations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    /// A named variable, identified by name and enclosing scope
    User {
        /// Source name
        name: String,
        /// Start offset of the nearest enclosing scope
        scope_start: u32,
    },
    /// A synthesized temporary, identified by purpose and construct
    Purposed {
        /// What the temporary is for
        purpose: SynthesizedPurpose,
        /// Source offset of the introducing construct
        anchor: u32,
        /// Position among same-purpose siblings of the construct
        ordinal: u16,
    },
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { name, scope_start } => write!(f, "{name}@{scope_start}"),
            Self::Purposed {
                purpose,
                anchor,
                ordinal,
            } => write!(f, "{purpose}@{anchor}.{ordinal}"),
        }
    }
}

/// One entry of the front end's ordered declaration sequence.
///
/// Exactly one of the three forms is valid: named (user local), purposed
/// (synthesized temporary), or transient. Anything else is an input-contract
/// violation reported by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Source name, for user locals
    pub name: Option<String>,
    /// Purpose, for synthesized temporaries
    pub purpose: Option<SynthesizedPurpose>,
    /// Source offset of the introducing construct, for synthesized temporaries
    pub anchor: Option<u32>,
    /// Live region: the declaring scope for user locals, the live range for
    /// transients (used for same-generation slot sharing)
    pub scope: Option<ScopeSpan>,
    /// Value-shape category, meaningful for transients
    pub shape: ValueShape,
    /// Whether this is an unnamed scratch value
    pub transient: bool,
}

impl Declaration {
    /// A source-named variable declared in `scope`
    pub fn user(name: impl Into<String>, scope: ScopeSpan) -> Self {
        Self {
            name: Some(name.into()),
            purpose: None,
            anchor: None,
            scope: Some(scope),
            shape: ValueShape::Word,
            transient: false,
        }
    }

    /// A synthesized temporary introduced by the construct at `anchor`
    pub fn synthesized(purpose: SynthesizedPurpose, anchor: u32) -> Self {
        Self {
            name: None,
            purpose: Some(purpose),
            anchor: Some(anchor),
            scope: None,
            shape: ValueShape::Word,
            transient: false,
        }
    }

    /// A scratch temporary of the given shape
    pub fn transient(shape: ValueShape) -> Self {
        Self {
            name: None,
            purpose: None,
            anchor: None,
            scope: None,
            shape,
            transient: true,
        }
    }

    /// Attach a live span (enables slot sharing for transients)
    pub fn with_span(mut self, span: ScopeSpan) -> Self {
        self.scope = Some(span);
        self
    }
}

/// Derives stable identity keys for a declaration sequence.
///
/// Stateful only to hand out ordinals: when one construct introduces several
/// temporaries of the same purpose (one bound cache per array dimension,
/// say), they are numbered in declaration order.
#[derive(Debug, Default)]
pub struct KeyExtractor {
    ordinals: FxHashMap<(SynthesizedPurpose, u32), u16>,
}

impl KeyExtractor {
    /// Create a new extractor for one declaration sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the key (if any) and table descriptor for one declaration.
    ///
    /// `index` is the declaration's position, used only for error reporting.
    pub fn extract(
        &mut self,
        index: usize,
        decl: &Declaration,
    ) -> Result<(Option<SlotKey>, SlotDescriptor)> {
        if decl.transient {
            if decl.name.is_some() || decl.purpose.is_some() {
                return Err(LayoutError::MalformedDeclaration {
                    index,
                    reason: "transient declarations carry no name or purpose",
                });
            }
            return Ok((None, SlotDescriptor::Transient { shape: decl.shape }));
        }

        match (&decl.name, decl.purpose) {
            (Some(name), None) => {
                let scope = decl.scope.ok_or(LayoutError::MalformedDeclaration {
                    index,
                    reason: "user local without a declaring scope",
                })?;
                let descriptor = SlotDescriptor::UserLocal {
                    name: name.clone(),
                    scope,
                };
                let key = descriptor.key();
                Ok((key, descriptor))
            }
            (None, Some(purpose)) => {
                let anchor = decl.anchor.ok_or(LayoutError::MalformedDeclaration {
                    index,
                    reason: "synthesized temporary without a construct anchor",
                })?;
                let ordinal = self.ordinals.entry((purpose, anchor)).or_insert(0);
                let descriptor = SlotDescriptor::Synthesized {
                    purpose,
                    anchor,
                    ordinal: *ordinal,
                };
                *ordinal += 1;
                let key = descriptor.key();
                Ok((key, descriptor))
            }
            (Some(_), Some(_)) => Err(LayoutError::MalformedDeclaration {
                index,
                reason: "declaration is both named and synthesized",
            }),
            (None, None) => Err(LayoutError::MalformedDeclaration {
                index,
                reason: "declaration is neither named, synthesized nor transient",
            }),
        }
    }
}
