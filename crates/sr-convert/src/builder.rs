use rhai::Dynamic;
use sr_core::{ConvertError, Descriptor, DescriptorKind};

use crate::access;

/// One encoding strategy per structural kind, accumulating indexed writes
/// into a freshly constructed dynamic value. Builders are stacked by the
/// encoder, one frame per structural level.
pub enum Builder {
    Record {
        object: Dynamic,
        key: Option<String>,
    },
    List {
        array: Dynamic,
        index: usize,
    },
    Map {
        object: Dynamic,
        index: usize,
        pending_key: Option<String>,
    },
    Open {
        index: Option<usize>,
        tag_name: String,
        tag_value: Option<Dynamic>,
        value: Option<Dynamic>,
    },
}

impl Builder {
    pub fn for_kind(descriptor: &Descriptor) -> Result<Self, ConvertError> {
        match descriptor.kind {
            DescriptorKind::Record => Ok(Builder::Record {
                object: access::new_object(),
                key: None,
            }),
            DescriptorKind::List => Ok(Builder::List {
                array: access::new_array(),
                index: 0,
            }),
            DescriptorKind::Map => Ok(Builder::Map {
                object: access::new_object(),
                index: 0,
                pending_key: None,
            }),
            DescriptorKind::OpenPolymorphic => Ok(Builder::Open {
                index: None,
                tag_name: descriptor.element_name(0).unwrap_or("type").to_string(),
                tag_value: None,
                value: None,
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

    pub fn set_index(&mut self, descriptor: &Descriptor, index: usize) {
        match self {
            Builder::Record { key, .. } => {
                *key = descriptor.element_name(index).map(str::to_string);
            }
            Builder::List { index: slot, .. } => *slot = index,
            Builder::Map { index: slot, .. } => *slot = index,
            Builder::Open { index: slot, .. } => *slot = Some(index),
        }
    }

    pub fn set_value(&mut self, value: Dynamic) -> Result<(), ConvertError> {
        match self {
            Builder::Record { object, key } => match key {
                Some(key) => access::set_named(object, key, value),
                // A write with no addressed field is dropped.
                None => Ok(()),
            },
            Builder::List { array, index } => access::set_indexed(array, *index, value),
            Builder::Map {
                object,
                index,
                pending_key,
            } => {
                if *index % 2 == 0 {
                    *pending_key = Some(access::text(&value));
                    Ok(())
                } else {
                    match pending_key.take() {
                        Some(key) => access::set_named(object, &key, value),
                        None => Ok(()),
                    }
                }
            }
            Builder::Open {
                index,
                tag_name,
                tag_value,
                value: result,
            } => match index {
                Some(0) => {
                    *tag_value = Some(value);
                    Ok(())
                }
                Some(1) => {
                    let mut nested = value;
                    if access::is_object(&nested) {
                        if let Some(tag) = tag_value.take() {
                            access::set_named(&mut nested, tag_name, tag)?;
                        }
                        *result = Some(nested);
                    }
                    Ok(())
                }
                // Writes past the value slot are ignored.
                _ => Ok(()),
            },
        }
    }

    pub fn finish(self) -> Result<Dynamic, ConvertError> {
        match self {
            Builder::Record { object, .. } => Ok(object),
            Builder::List { array, .. } => Ok(array),
            Builder::Map { object, .. } => Ok(object),
            Builder::Open { value, .. } => value.ok_or_else(|| {
                ConvertError::new(
                    "CONVERT_ENCODE_EMPTY",
                    "Polymorphic encode produced no value.",
                )
            }),
        }
    }
}

#[cfg(test)]
mod builder_tests {
    use rhai::{ImmutableString, INT};

    use super::*;

    #[test]
    fn record_builder_assigns_addressed_fields_and_drops_the_rest() {
        let descriptor = Descriptor::record("Data", ["name", "value"]);
        let mut builder = Builder::for_kind(&descriptor).expect("record builder");

        // No set_index yet: the write must be dropped.
        builder.set_value("orphan".into()).expect("dropped write");
        builder.set_index(&descriptor, 0);
        builder.set_value("XXX".into()).expect("name write");
        let object = builder.finish().expect("finish");
        assert_eq!(access::to_json(&object).to_string(), r#"{"name":"XXX"}"#);
    }

    #[test]
    fn list_builder_assigns_slots_by_index() {
        let descriptor = Descriptor::list("List");
        let mut builder = Builder::for_kind(&descriptor).expect("list builder");
        builder.set_index(&descriptor, 0);
        builder.set_value(Dynamic::from_int(1)).expect("slot 0");
        builder.set_index(&descriptor, 1);
        builder.set_value(Dynamic::from_int(2)).expect("slot 1");
        let array = builder.finish().expect("finish");
        assert_eq!(access::to_json(&array).to_string(), "[1,2]");
    }

    #[test]
    fn map_builder_pairs_even_keys_with_odd_values() {
        let descriptor = Descriptor::map("Map");
        let mut builder = Builder::for_kind(&descriptor).expect("map builder");
        builder.set_index(&descriptor, 0);
        builder.set_value("A".into()).expect("key");
        builder.set_index(&descriptor, 1);
        builder.set_value("B".into()).expect("value");
        let object = builder.finish().expect("finish");
        assert_eq!(access::to_json(&object).to_string(), r#"{"A":"B"}"#);
    }

    #[test]
    fn map_builder_stringifies_non_string_keys() {
        let descriptor = Descriptor::map("Map");
        let mut builder = Builder::for_kind(&descriptor).expect("map builder");
        builder.set_index(&descriptor, 0);
        builder.set_value(Dynamic::from_int(7)).expect("key");
        builder.set_index(&descriptor, 1);
        builder.set_value("X".into()).expect("value");
        let object = builder.finish().expect("finish");
        assert_eq!(access::to_json(&object).to_string(), r#"{"7":"X"}"#);
    }

    #[test]
    fn open_builder_injects_the_discriminant_into_its_value() {
        let descriptor = Descriptor::open("Project", "type");
        let mut builder = Builder::for_kind(&descriptor).expect("open builder");
        builder.set_index(&descriptor, 0);
        builder.set_value("OwnedProject".into()).expect("tag");
        builder.set_index(&descriptor, 1);
        let mut nested = access::new_object();
        access::set_named(&mut nested, "name", "X".into()).expect("nested field");
        builder.set_value(nested).expect("value");
        // Writes past the value slot are ignored.
        builder.set_index(&descriptor, 2);
        builder.set_value("ignored".into()).expect("ignored write");

        let object = builder.finish().expect("finish");
        let tag = access::get_named(&object, "type").expect("injected tag");
        assert_eq!(tag.cast::<ImmutableString>().to_string(), "OwnedProject");
        let name = access::get_named(&object, "name").expect("retained field");
        assert_eq!(name.cast::<ImmutableString>().to_string(), "X");
    }

    #[test]
    fn open_builder_without_a_value_write_fails_to_finish() {
        let descriptor = Descriptor::open("Project", "type");
        let builder = Builder::for_kind(&descriptor).expect("open builder");
        let error = builder.finish().expect_err("no value written");
        assert_eq!(error.code, "CONVERT_ENCODE_EMPTY");
    }

    #[test]
    fn list_slots_may_be_written_out_of_order() {
        let descriptor = Descriptor::list("List");
        let mut builder = Builder::for_kind(&descriptor).expect("list builder");
        builder.set_index(&descriptor, 1);
        builder.set_value(Dynamic::from_int(2)).expect("slot 1");
        builder.set_index(&descriptor, 0);
        builder.set_value(Dynamic::from_int(1)).expect("slot 0");
        let array = builder.finish().expect("finish");
        assert_eq!(
            access::get_indexed(&array, 0).expect("slot 0").cast::<INT>(),
            1
        );
        assert_eq!(
            access::get_indexed(&array, 1).expect("slot 1").cast::<INT>(),
            2
        );
    }
}
