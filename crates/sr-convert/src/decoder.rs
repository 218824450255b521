use std::any::{Any, TypeId};

use rhai::{Dynamic, ImmutableString, FLOAT, INT};
use sr_core::{ConvertError, Descriptor, DescriptorKind};

use crate::access;
use crate::convert::Convert;
use crate::cursor::{Cursor, ElementIndex};
use crate::numeric;
use crate::registry::{short_type_name, ConverterRegistry};
use crate::MAX_NESTING_DEPTH;

/// Decode-side conversion driver: one decoder per structural level, created
/// by recursive descent. Scalar reads address whatever value the current
/// cursor points at.
pub struct Decoder<'r> {
    registry: &'r ConverterRegistry,
    cursor: Cursor,
    depth: usize,
}

impl std::fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("cursor", &self.cursor)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl<'r> Decoder<'r> {
    pub fn new(value: Dynamic, registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            cursor: Cursor::root(value),
            depth: 0,
        }
    }

    pub(crate) fn nested(
        value: Dynamic,
        registry: &'r ConverterRegistry,
        depth: usize,
    ) -> Result<Self, ConvertError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ConvertError::depth_exceeded(MAX_NESTING_DEPTH));
        }
        Ok(Self {
            registry,
            cursor: Cursor::root(value),
            depth,
        })
    }

    /// Replaces the root cursor with the structural strategy selected by the
    /// descriptor's kind, positioned over the current value.
    pub fn begin(&mut self, descriptor: &Descriptor) -> Result<(), ConvertError> {
        let value = self.current_value()?;
        self.cursor = Cursor::for_kind(descriptor, value)?;
        Ok(())
    }

    pub fn next_index(&mut self, descriptor: &Descriptor) -> Result<ElementIndex, ConvertError> {
        Ok(self.cursor.next_index(descriptor))
    }

    fn current_value(&self) -> Result<Dynamic, ConvertError> {
        self.cursor.current().cloned().ok_or_else(|| {
            ConvertError::new(
                "CONVERT_CURSOR_POSITION",
                "No value is addressed at the current cursor position.",
            )
        })
    }

    pub fn decode_bool(&mut self) -> Result<bool, ConvertError> {
        let value = self.current_value()?;
        if value.is::<bool>() {
            Ok(value.cast::<bool>())
        } else {
            Err(ConvertError::type_mismatch("boolean", access::kind_name(&value)))
        }
    }

    pub fn decode_string(&mut self) -> Result<String, ConvertError> {
        let value = self.current_value()?;
        if value.is::<ImmutableString>() {
            Ok(value.cast::<ImmutableString>().to_string())
        } else {
            Err(ConvertError::type_mismatch("string", access::kind_name(&value)))
        }
    }

    /// All numeric decoding funnels through the interpreter's native double
    /// representation before narrowing.
    fn decode_number(&mut self) -> Result<f64, ConvertError> {
        let value = self.current_value()?;
        if value.is::<INT>() {
            Ok(value.cast::<INT>() as f64)
        } else if value.is::<FLOAT>() {
            Ok(value.cast::<FLOAT>())
        } else {
            Err(ConvertError::type_mismatch("numeric", access::kind_name(&value)))
        }
    }

    pub fn decode_i8(&mut self) -> Result<i8, ConvertError> {
        Ok(numeric::to_i8(self.decode_number()?))
    }

    pub fn decode_i16(&mut self) -> Result<i16, ConvertError> {
        Ok(numeric::to_i16(self.decode_number()?))
    }

    pub fn decode_i32(&mut self) -> Result<i32, ConvertError> {
        Ok(numeric::to_i32(self.decode_number()?))
    }

    pub fn decode_i64(&mut self) -> Result<i64, ConvertError> {
        Ok(numeric::to_i64(self.decode_number()?))
    }

    pub fn decode_f32(&mut self) -> Result<f32, ConvertError> {
        Ok(numeric::to_f32(self.decode_number()?))
    }

    pub fn decode_f64(&mut self) -> Result<f64, ConvertError> {
        self.decode_number()
    }

    pub fn decode_char(&mut self) -> Result<char, ConvertError> {
        let number = self.decode_number()?;
        numeric::to_char(number).ok_or_else(|| {
            ConvertError::new(
                "CONVERT_CODEPOINT_INVALID",
                format!("Value {} is not a valid character code point.", number),
            )
        })
    }

    /// Decodes the value at the current cursor position into `T`. The
    /// registry is consulted first; a registered contextual converter is
    /// used exclusively. Structured kinds recurse through a nested decoder.
    pub fn decode_value<T: Convert>(&mut self) -> Result<T, ConvertError> {
        let registry = self.registry;
        if let Some(converter) = registry.contextual_for(TypeId::of::<T>()) {
            let decoded = (converter.decode)(self)?;
            return downcast_decoded(decoded);
        }
        let descriptor = T::descriptor();
        if descriptor.kind == DescriptorKind::Scalar {
            return T::decode(self);
        }
        let value = self.current_value()?;
        let mut nested = Decoder::nested(value, registry, self.depth + 1)?;
        T::decode(&mut nested)
    }

    /// Decodes a type that has no structural decomposition through its
    /// registered contextual converter.
    pub fn decode_contextual<T: Any>(&mut self) -> Result<T, ConvertError> {
        let registry = self.registry;
        let Some(converter) = registry.contextual_for(TypeId::of::<T>()) else {
            return Err(ConvertError::missing_serializer(short_type_name::<T>()));
        };
        let decoded = (converter.decode)(self)?;
        downcast_decoded(decoded)
    }

    /// Open polymorphic dispatch: read the discriminant, resolve the
    /// concrete decoder through the registered family (falling back to its
    /// default), then re-dispatch over the whole value. Resolution happens
    /// once per decoded value.
    pub fn decode_open<T: Any>(&mut self, descriptor: &Descriptor) -> Result<T, ConvertError> {
        self.begin(descriptor)?;
        let discriminant = match self.next_index(descriptor)? {
            ElementIndex::At(0) => Some(self.decode_string()?),
            ElementIndex::Unknown => None,
            _ => return Err(open_cursor_misuse()),
        };
        match self.next_index(descriptor)? {
            ElementIndex::At(1) => {}
            _ => return Err(open_cursor_misuse()),
        }

        let registry = self.registry;
        let Some(family) = registry.family_for(TypeId::of::<T>()) else {
            return Err(ConvertError::new(
                "CONVERT_FAMILY_MISSING",
                format!(
                    "No polymorphic family is registered for \"{}\".",
                    descriptor.type_name
                ),
            ));
        };
        let variant = family.resolve(discriminant.as_deref()).ok_or_else(|| {
            ConvertError::unknown_discriminant(
                discriminant.as_deref().unwrap_or("<absent>"),
                family.type_name(),
            )
        })?;
        let decoded = variant(self)?;
        downcast_decoded(decoded)
    }
}

fn downcast_decoded<T: Any>(value: Box<dyn Any>) -> Result<T, ConvertError> {
    value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
        ConvertError::new(
            "CONVERT_CONTEXTUAL_TYPE",
            format!(
                "Converter for '{}' produced a different type.",
                short_type_name::<T>()
            ),
        )
    })
}

fn open_cursor_misuse() -> ConvertError {
    ConvertError::new(
        "CONVERT_CURSOR_POSITION",
        "Open cursor yielded an unexpected index.",
    )
}
