use rhai::Dynamic;
use sr_core::{ConvertError, Descriptor, DescriptorKind};

use crate::access;
use crate::entries::MapEntries;

/// Outcome of advancing a decoding cursor. `Unknown` is only produced by the
/// open polymorphic cursor when the discriminant property is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementIndex {
    At(usize),
    Done,
    Unknown,
}

/// One decoding strategy per structural kind. `Root` holds the undecomposed
/// input value before a structure is begun; it is also where scalar decodes
/// read from at the top level.
#[derive(Debug)]
pub enum Cursor {
    Root {
        value: Dynamic,
    },
    Record {
        value: Dynamic,
        index: usize,
        current: Option<Dynamic>,
    },
    List {
        value: Dynamic,
        length: usize,
        index: usize,
        current: Option<Dynamic>,
    },
    Map {
        entries: MapEntries,
        index: usize,
        current: Option<Dynamic>,
    },
    Open {
        value: Dynamic,
        index: usize,
        current: Option<Dynamic>,
    },
}

impl Cursor {
    pub fn root(value: Dynamic) -> Self {
        Cursor::Root { value }
    }

    pub fn for_kind(descriptor: &Descriptor, value: Dynamic) -> Result<Self, ConvertError> {
        match descriptor.kind {
            DescriptorKind::Record => Ok(Cursor::Record {
                value,
                index: 0,
                current: None,
            }),
            DescriptorKind::List => {
                // Length is read once; a missing length degrades to empty.
                let length = access::length(&value).unwrap_or(0);
                Ok(Cursor::List {
                    value,
                    length,
                    index: 0,
                    current: None,
                })
            }
            DescriptorKind::Map => Ok(Cursor::Map {
                entries: MapEntries::new(&value),
                index: 0,
                current: None,
            }),
            DescriptorKind::OpenPolymorphic => Ok(Cursor::Open {
                value,
                index: 0,
                current: None,
            }),
            DescriptorKind::Scalar => Err(ConvertError::new(
                "CONVERT_DESCRIPTOR_KIND",
                format!(
                    "Scalar descriptor \"{}\" cannot begin a structure.",
                    descriptor.type_name
                ),
            )),
        }
    }

    pub fn next_index(&mut self, descriptor: &Descriptor) -> ElementIndex {
        match self {
            Cursor::Root { .. } => ElementIndex::Done,
            Cursor::Record {
                value,
                index,
                current,
            } => {
                while *index < descriptor.elements.len() {
                    let name = &descriptor.elements[*index];
                    let at = *index;
                    *index += 1;
                    match access::get_named(value, name) {
                        Some(found) if !found.is_unit() => {
                            *current = Some(found);
                            return ElementIndex::At(at);
                        }
                        _ => {}
                    }
                }
                *current = None;
                ElementIndex::Done
            }
            Cursor::List {
                value,
                length,
                index,
                current,
            } => {
                if *index < *length {
                    let at = *index;
                    *index += 1;
                    *current = Some(access::get_indexed(value, at).unwrap_or(Dynamic::UNIT));
                    ElementIndex::At(at)
                } else {
                    *current = None;
                    ElementIndex::Done
                }
            }
            Cursor::Map {
                entries,
                index,
                current,
            } => match entries.next_slot() {
                Some(slot) => {
                    let at = *index;
                    *index += 1;
                    *current = Some(slot);
                    ElementIndex::At(at)
                }
                None => {
                    *current = None;
                    ElementIndex::Done
                }
            },
            Cursor::Open {
                value,
                index,
                current,
            } => match *index {
                0 => {
                    *index = 1;
                    let tag = descriptor
                        .element_name(0)
                        .and_then(|name| access::get_named(value, name));
                    match tag {
                        Some(found) if !found.is_unit() => {
                            *current = Some(found);
                            ElementIndex::At(0)
                        }
                        _ => {
                            *current = None;
                            ElementIndex::Unknown
                        }
                    }
                }
                1 => {
                    *index = 2;
                    *current = Some(value.clone());
                    ElementIndex::At(1)
                }
                _ => {
                    *current = None;
                    ElementIndex::Done
                }
            },
        }
    }

    pub fn current(&self) -> Option<&Dynamic> {
        match self {
            Cursor::Root { value } => Some(value),
            Cursor::Record { current, .. }
            | Cursor::List { current, .. }
            | Cursor::Map { current, .. }
            | Cursor::Open { current, .. } => current.as_ref(),
        }
    }
}
