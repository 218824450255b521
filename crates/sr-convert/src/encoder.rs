use std::any::{Any, TypeId};

use rhai::{Dynamic, INT};
use sr_core::{ConvertError, Descriptor};

use crate::builder::Builder;
use crate::convert::Convert;
use crate::registry::{short_type_name, ConverterRegistry};
use crate::MAX_NESTING_DEPTH;

/// Encode-side conversion driver. Builders are kept on an explicit stack,
/// one frame per structural level; ending a structure pops the frame and
/// writes the finished value into the frame below, or makes it the result
/// at the root. Stack height always equals structural recursion depth.
pub struct Encoder<'r> {
    registry: &'r ConverterRegistry,
    stack: Vec<Builder>,
    result: Option<Dynamic>,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            result: None,
        }
    }

    pub fn begin(&mut self, descriptor: &Descriptor) -> Result<(), ConvertError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(ConvertError::depth_exceeded(MAX_NESTING_DEPTH));
        }
        self.stack.push(Builder::for_kind(descriptor)?);
        Ok(())
    }

    pub fn set_index(&mut self, descriptor: &Descriptor, index: usize) -> Result<(), ConvertError> {
        match self.stack.last_mut() {
            Some(builder) => {
                builder.set_index(descriptor, index);
                Ok(())
            }
            None => Err(no_open_structure()),
        }
    }

    pub fn end(&mut self, _descriptor: &Descriptor) -> Result<(), ConvertError> {
        let builder = self.stack.pop().ok_or_else(no_open_structure)?;
        let finished = builder.finish()?;
        self.write(finished)
    }

    fn write(&mut self, value: Dynamic) -> Result<(), ConvertError> {
        match self.stack.last_mut() {
            Some(builder) => builder.set_value(value),
            None => {
                self.result = Some(value);
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Result<Dynamic, ConvertError> {
        self.result.ok_or_else(|| {
            ConvertError::new("CONVERT_ENCODE_EMPTY", "Encode produced no value.")
        })
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<(), ConvertError> {
        self.write(Dynamic::from_bool(value))
    }

    pub fn encode_string(&mut self, value: &str) -> Result<(), ConvertError> {
        self.write(value.into())
    }

    pub fn encode_i8(&mut self, value: i8) -> Result<(), ConvertError> {
        self.write(Dynamic::from_int(value as INT))
    }

    pub fn encode_i16(&mut self, value: i16) -> Result<(), ConvertError> {
        self.write(Dynamic::from_int(value as INT))
    }

    pub fn encode_i32(&mut self, value: i32) -> Result<(), ConvertError> {
        self.write(Dynamic::from_int(value as INT))
    }

    pub fn encode_i64(&mut self, value: i64) -> Result<(), ConvertError> {
        self.write(Dynamic::from_int(value))
    }

    pub fn encode_f32(&mut self, value: f32) -> Result<(), ConvertError> {
        self.write(Dynamic::from_float(value as f64))
    }

    pub fn encode_f64(&mut self, value: f64) -> Result<(), ConvertError> {
        self.write(Dynamic::from_float(value))
    }

    /// Characters travel as their integer code point, the same channel the
    /// decoder narrows them out of.
    pub fn encode_char(&mut self, value: char) -> Result<(), ConvertError> {
        self.write(Dynamic::from_int(value as u32 as INT))
    }

    /// Encodes `value` at the current write position. The registry is
    /// consulted first; a registered contextual converter is used
    /// exclusively.
    pub fn encode_value<T: Convert>(&mut self, value: &T) -> Result<(), ConvertError> {
        let registry = self.registry;
        if let Some(converter) = registry.contextual_for(TypeId::of::<T>()) {
            return (converter.encode)(value as &dyn Any, self);
        }
        value.encode(self)
    }

    /// Encodes a type that has no structural decomposition through its
    /// registered contextual converter.
    pub fn encode_contextual<T: Any>(&mut self, value: &T) -> Result<(), ConvertError> {
        let registry = self.registry;
        let Some(converter) = registry.contextual_for(TypeId::of::<T>()) else {
            return Err(ConvertError::missing_serializer(short_type_name::<T>()));
        };
        (converter.encode)(value as &dyn Any, self)
    }

    /// Encodes one concrete member of an open polymorphic family: the
    /// concrete descriptor's `type_name` is written as the discriminant,
    /// then the full record, which the open builder injects the tag into.
    pub fn encode_open<C: Convert>(
        &mut self,
        descriptor: &Descriptor,
        concrete: &C,
    ) -> Result<(), ConvertError> {
        self.begin(descriptor)?;
        self.set_index(descriptor, 0)?;
        self.encode_string(&C::descriptor().type_name)?;
        self.set_index(descriptor, 1)?;
        self.encode_value(concrete)?;
        self.end(descriptor)
    }
}

fn no_open_structure() -> ConvertError {
    ConvertError::new(
        "CONVERT_BUILDER_MISSING",
        "No structure is being built at the current write position.",
    )
}
