use std::any::Any;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use sr_core::{ConvertError, Descriptor};

use crate::cursor::ElementIndex;
use crate::decoder::Decoder;
use crate::encoder::Encoder;

/// A type the conversion driver can move across the script boundary. The
/// descriptor announces the structural kind; `decode`/`encode` walk it
/// element by element against the driver.
pub trait Convert: Sized + Any {
    fn descriptor() -> Descriptor;
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError>;
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError>;
}

macro_rules! scalar_convert {
    ($($target:ty => $name:literal, $decode:ident, $encode:ident;)*) => {$(
        impl Convert for $target {
            fn descriptor() -> Descriptor {
                Descriptor::scalar($name)
            }

            fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError> {
                decoder.$decode()
            }

            fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError> {
                encoder.$encode(*self)
            }
        }
    )*};
}

scalar_convert! {
    bool => "Boolean", decode_bool, encode_bool;
    i8 => "Byte", decode_i8, encode_i8;
    i16 => "Short", decode_i16, encode_i16;
    i32 => "Int", decode_i32, encode_i32;
    i64 => "Long", decode_i64, encode_i64;
    f32 => "Float", decode_f32, encode_f32;
    f64 => "Double", decode_f64, encode_f64;
    char => "Char", decode_char, encode_char;
}

impl Convert for String {
    fn descriptor() -> Descriptor {
        Descriptor::scalar("String")
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError> {
        decoder.decode_string()
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError> {
        encoder.encode_string(self)
    }
}

impl<T: Convert> Convert for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::list("List")
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError> {
        let descriptor = Self::descriptor();
        decoder.begin(&descriptor)?;
        let mut items = Vec::new();
        while let ElementIndex::At(_) = decoder.next_index(&descriptor)? {
            items.push(decoder.decode_value::<T>()?);
        }
        Ok(items)
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError> {
        let descriptor = Self::descriptor();
        encoder.begin(&descriptor)?;
        for (index, item) in self.iter().enumerate() {
            encoder.set_index(&descriptor, index)?;
            encoder.encode_value(item)?;
        }
        encoder.end(&descriptor)
    }
}

fn decode_string_keyed<T, F>(
    decoder: &mut Decoder<'_>,
    descriptor: &Descriptor,
    mut insert: F,
) -> Result<(), ConvertError>
where
    T: Convert,
    F: FnMut(String, T),
{
    decoder.begin(descriptor)?;
    while let ElementIndex::At(_) = decoder.next_index(descriptor)? {
        let key = decoder.decode_string()?;
        match decoder.next_index(descriptor)? {
            ElementIndex::At(_) => insert(key, decoder.decode_value::<T>()?),
            _ => {
                return Err(ConvertError::new(
                    "CONVERT_MAP_ENTRY",
                    format!("Map entry \"{}\" has no value.", key),
                ))
            }
        }
    }
    Ok(())
}

fn encode_string_keyed<'a, T, I>(
    encoder: &mut Encoder<'_>,
    descriptor: &Descriptor,
    entries: I,
) -> Result<(), ConvertError>
where
    T: Convert + 'a,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    encoder.begin(descriptor)?;
    let mut index = 0usize;
    for (key, value) in entries {
        encoder.set_index(descriptor, index)?;
        encoder.encode_string(key)?;
        index += 1;
        encoder.set_index(descriptor, index)?;
        encoder.encode_value(value)?;
        index += 1;
    }
    encoder.end(descriptor)
}

/// The insertion-ordered map: entries come back in the order the script
/// value enumerates them and go out in the order they are held.
impl<T: Convert> Convert for IndexMap<String, T> {
    fn descriptor() -> Descriptor {
        Descriptor::map("Map")
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError> {
        let descriptor = Self::descriptor();
        let mut entries = IndexMap::new();
        decode_string_keyed::<T, _>(decoder, &descriptor, |key, value| {
            entries.insert(key, value);
        })?;
        Ok(entries)
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError> {
        encode_string_keyed(encoder, &Self::descriptor(), self.iter())
    }
}

impl<T: Convert> Convert for BTreeMap<String, T> {
    fn descriptor() -> Descriptor {
        Descriptor::map("Map")
    }

    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, ConvertError> {
        let descriptor = Self::descriptor();
        let mut entries = BTreeMap::new();
        decode_string_keyed::<T, _>(decoder, &descriptor, |key, value| {
            entries.insert(key, value);
        })?;
        Ok(entries)
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), ConvertError> {
        encode_string_keyed(encoder, &Self::descriptor(), self.iter())
    }
}
