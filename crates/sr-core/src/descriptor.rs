use serde::{Deserialize, Serialize};

/// Structural kind of a target type. `Scalar` never drives a cursor or a
/// builder; the other kinds select one strategy per structural level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DescriptorKind {
    Scalar,
    Record,
    List,
    Map,
    OpenPolymorphic,
}

/// Ordered, immutable description of a target type's shape. For records and
/// open polymorphic types `elements` is the canonical element order; the
/// element position is the index cursors and builders speak in. For a
/// concrete member of a polymorphic family, `type_name` doubles as the
/// discriminant value written into the dynamic value on encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub type_name: String,
    pub kind: DescriptorKind,
    pub elements: Vec<String>,
}

impl Descriptor {
    pub fn scalar(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DescriptorKind::Scalar,
            elements: Vec::new(),
        }
    }

    pub fn record<const N: usize>(type_name: impl Into<String>, elements: [&str; N]) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DescriptorKind::Record,
            elements: elements.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn list(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DescriptorKind::List,
            elements: Vec::new(),
        }
    }

    pub fn map(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DescriptorKind::Map,
            elements: Vec::new(),
        }
    }

    /// Open polymorphic shape: element 0 is the discriminant property name,
    /// element 1 the slot the full value is re-dispatched through.
    pub fn open(type_name: impl Into<String>, discriminant: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DescriptorKind::OpenPolymorphic,
            elements: vec![discriminant.into(), "value".to_string()],
        }
    }

    pub fn element_name(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }
}
