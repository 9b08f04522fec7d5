//! Persisted slot table encoding
//!
//! A versioned, line-oriented text encoding of one generation's table,
//! carried in the method's debug-information record. Decoding generation
//! *N*'s encoding and feeding it back as the previous table of generation
//! *N+1* is equivalent to holding the in-memory table, so the encoding
//! must capture everything the allocator matches on: names, scopes,
//! purposes, anchors, ordinals, shapes and retired keys.
//!
//! ```text
//! MOLTTAB 1
//! user 0..85 j
//! syn loop-flag @11.0
//! temp word
//! unused
//! unused syn lock-target @34.0
//! ```

use std::fmt::Write as _;

use rustc_hash::FxHashSet;

use crate::descriptor::{SlotDescriptor, SlotKey};
use crate::error::{LayoutError, Result};
use crate::slot::{ScopeSpan, SynthesizedPurpose, ValueShape};
use crate::table::GenerationTable;
use crate::{TABLE_MAGIC, TABLE_VERSION};

impl GenerationTable {
    /// Render the table as its stable text encoding
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{TABLE_MAGIC} {TABLE_VERSION}");
        for (_, descriptor) in self.iter() {
            match descriptor {
                SlotDescriptor::UserLocal { name, scope } => {
                    let _ = writeln!(out, "user {scope} {name}");
                }
                SlotDescriptor::Synthesized {
                    purpose,
                    anchor,
                    ordinal,
                } => {
                    let _ = writeln!(out, "syn {purpose} @{anchor}.{ordinal}");
                }
                SlotDescriptor::Transient { shape } => {
                    let _ = writeln!(out, "temp {shape}");
                }
                SlotDescriptor::Unused { retired: None } => {
                    let _ = writeln!(out, "unused");
                }
                SlotDescriptor::Unused {
                    retired: Some(SlotKey::User { name, scope_start }),
                } => {
                    let _ = writeln!(out, "unused user @{scope_start} {name}");
                }
                SlotDescriptor::Unused {
                    retired:
                        Some(SlotKey::Purposed {
                            purpose,
                            anchor,
                            ordinal,
                        }),
                } => {
                    let _ = writeln!(out, "unused syn {purpose} @{anchor}.{ordinal}");
                }
            }
        }
        out
    }

    /// Parse a table previously rendered by [`Self::encode`]
    pub fn decode(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate();

        let (_, header) = lines.next().ok_or(LayoutError::InvalidHeader)?;
        let mut parts = header.split_whitespace();
        if parts.next() != Some(TABLE_MAGIC) {
            return Err(LayoutError::InvalidHeader);
        }
        let version: u32 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or(LayoutError::InvalidHeader)?;
        if version != TABLE_VERSION {
            return Err(LayoutError::UnsupportedVersion(version));
        }

        let mut slots = Vec::new();
        for (number, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let descriptor = parse_slot(line).ok_or_else(|| LayoutError::MalformedEntry {
                line: number + 1,
                text: line.to_string(),
            })?;
            slots.push(descriptor);
        }

        // Invariant: at most one descriptor per key, retired keys included.
        let mut keys: FxHashSet<SlotKey> = FxHashSet::default();
        for descriptor in &slots {
            if let Some(key) = descriptor.key() {
                if !keys.insert(key.clone()) {
                    return Err(LayoutError::DuplicateKey(key));
                }
            }
        }

        Ok(Self::from_slots(slots))
    }
}

fn parse_slot(line: &str) -> Option<SlotDescriptor> {
    let (tag, rest) = split_word(line);
    match tag {
        "user" => {
            let (span, name) = split_word(rest);
            let scope = parse_span(span)?;
            if name.is_empty() {
                return None;
            }
            Some(SlotDescriptor::UserLocal {
                name: name.to_string(),
                scope,
            })
        }
        "syn" => {
            let (purpose, anchor) = split_word(rest);
            let purpose = SynthesizedPurpose::from_tag(purpose)?;
            let (anchor, ordinal) = parse_anchor(anchor)?;
            Some(SlotDescriptor::Synthesized {
                purpose,
                anchor,
                ordinal,
            })
        }
        "temp" => {
            let shape = ValueShape::from_tag(rest)?;
            Some(SlotDescriptor::Transient { shape })
        }
        "unused" => {
            if rest.is_empty() {
                return Some(SlotDescriptor::Unused { retired: None });
            }
            let (kind, rest) = split_word(rest);
            let key = match kind {
                "user" => {
                    let (start, name) = split_word(rest);
                    let scope_start: u32 = start.strip_prefix('@')?.parse().ok()?;
                    if name.is_empty() {
                        return None;
                    }
                    SlotKey::User {
                        name: name.to_string(),
                        scope_start,
                    }
                }
                "syn" => {
                    let (purpose, anchor) = split_word(rest);
                    let purpose = SynthesizedPurpose::from_tag(purpose)?;
                    let (anchor, ordinal) = parse_anchor(anchor)?;
                    SlotKey::Purposed {
                        purpose,
                        anchor,
                        ordinal,
                    }
                }
                _ => return None,
            };
            Some(SlotDescriptor::Unused { retired: Some(key) })
        }
        _ => None,
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(' ') {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (text, ""),
    }
}

/// `start..end`
fn parse_span(text: &str) -> Option<ScopeSpan> {
    let (start, end) = text.split_once("..")?;
    Some(ScopeSpan::new(start.parse().ok()?, end.parse().ok()?))
}

/// `@anchor.ordinal`
fn parse_anchor(text: &str) -> Option<(u32, u16)> {
    let (anchor, ordinal) = text.strip_prefix('@')?.split_once('.')?;
    Some((anchor.parse().ok()?, ordinal.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::allocate;
    use crate::descriptor::Declaration;

    fn sample() -> GenerationTable {
        GenerationTable::from_slots(vec![
            SlotDescriptor::UserLocal {
                name: "j".into(),
                scope: ScopeSpan::new(0, 85),
            },
            SlotDescriptor::Synthesized {
                purpose: SynthesizedPurpose::LoopConditionFlag,
                anchor: 11,
                ordinal: 0,
            },
            SlotDescriptor::Transient {
                shape: ValueShape::Word,
            },
            SlotDescriptor::Unused { retired: None },
            SlotDescriptor::Unused {
                retired: Some(SlotKey::Purposed {
                    purpose: SynthesizedPurpose::LockTarget,
                    anchor: 34,
                    ordinal: 0,
                }),
            },
            SlotDescriptor::Unused {
                retired: Some(SlotKey::User {
                    name: "tmp".into(),
                    scope_start: 7,
                }),
            },
        ])
    }

    #[test]
    fn test_encode_is_human_inspectable() {
        let text = sample().encode();
        let expected = "\
MOLTTAB 1
user 0..85 j
syn loop-flag @11.0
temp word
unused
unused syn lock-target @34.0
unused user @7 tmp
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_roundtrip() {
        let table = sample();
        let back = GenerationTable::decode(&table.encode()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_empty_table_roundtrip() {
        let table = GenerationTable::new();
        let back = GenerationTable::decode(&table.encode()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_decoded_table_is_equivalent_previous_input() {
        // Feeding the decoded encoding back as "previous" must allocate
        // exactly as the in-memory table would.
        let decls0 = vec![
            Declaration::user("x", ScopeSpan::new(0, 40)),
            Declaration::synthesized(SynthesizedPurpose::ResourceHandle, 9),
            Declaration::transient(ValueShape::Reference),
        ];
        let gen0 = allocate(None, &decls0).unwrap();

        let decls1 = vec![
            Declaration::user("x", ScopeSpan::new(0, 40)),
            Declaration::user("y", ScopeSpan::new(0, 40)),
        ];
        let direct = allocate(Some(&gen0.table), &decls1).unwrap();
        let decoded = GenerationTable::decode(&gen0.table.encode()).unwrap();
        let via_text = allocate(Some(&decoded), &decls1).unwrap();
        assert_eq!(via_text, direct);
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(
            GenerationTable::decode(""),
            Err(LayoutError::InvalidHeader)
        ));
        assert!(matches!(
            GenerationTable::decode("NOTATAB 1\n"),
            Err(LayoutError::InvalidHeader)
        ));
        assert!(matches!(
            GenerationTable::decode("MOLTTAB 9\n"),
            Err(LayoutError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_bad_entry() {
        let text = "MOLTTAB 1\nsyn made-up @1.0\n";
        assert!(matches!(
            GenerationTable::decode(text),
            Err(LayoutError::MalformedEntry { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let text = "MOLTTAB 1\nuser 0..10 x\nunused user @0 x\n";
        assert!(matches!(
            GenerationTable::decode(text),
            Err(LayoutError::DuplicateKey(_))
        ));
    }
}
