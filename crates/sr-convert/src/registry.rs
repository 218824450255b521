use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use sr_core::ConvertError;

use crate::convert::Convert;
use crate::decoder::Decoder;
use crate::encoder::Encoder;

pub(crate) type DecodeFn =
    Box<dyn Fn(&mut Decoder<'_>) -> Result<Box<dyn Any>, ConvertError> + Send + Sync>;
pub(crate) type EncodeFn =
    Box<dyn Fn(&dyn Any, &mut Encoder<'_>) -> Result<(), ConvertError> + Send + Sync>;

/// A custom scalar converter used instead of structural decomposition, for
/// types the engine does not understand natively.
pub struct ContextualConverter {
    pub(crate) decode: DecodeFn,
    pub(crate) encode: EncodeFn,
}

/// Dispatch table for one open polymorphic family: discriminant value to
/// concrete decoder, plus an optional default used when the discriminant is
/// absent or unregistered.
pub struct PolymorphicFamily {
    type_name: String,
    variants: BTreeMap<String, DecodeFn>,
    default_variant: Option<DecodeFn>,
}

impl PolymorphicFamily {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            variants: BTreeMap::new(),
            default_variant: None,
        }
    }

    /// Registers a concrete member. Its descriptor `type_name` is the
    /// discriminant value it is dispatched under, and the value written on
    /// encode.
    pub fn variant<C, T>(mut self, wrap: fn(C) -> T) -> Self
    where
        C: Convert,
        T: Any,
    {
        let discriminant = C::descriptor().type_name;
        self.variants.insert(discriminant, decode_into::<C, T>(wrap));
        self
    }

    /// Catch-all used for absent or unregistered discriminants. The whole
    /// value, raw discriminant included, is decoded against `C`.
    pub fn default_variant<C, T>(mut self, wrap: fn(C) -> T) -> Self
    where
        C: Convert,
        T: Any,
    {
        self.default_variant = Some(decode_into::<C, T>(wrap));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn resolve(&self, discriminant: Option<&str>) -> Option<&DecodeFn> {
        match discriminant {
            Some(tag) => self.variants.get(tag).or(self.default_variant.as_ref()),
            None => self.default_variant.as_ref(),
        }
    }
}

fn decode_into<C, T>(wrap: fn(C) -> T) -> DecodeFn
where
    C: Convert,
    T: Any,
{
    Box::new(move |decoder: &mut Decoder<'_>| {
        Ok(Box::new(wrap(decoder.decode_value::<C>()?)) as Box<dyn Any>)
    })
}

/// Lookup table from target type identity to custom converters and
/// polymorphic families. An explicit value passed into every conversion
/// call; read-only while a conversion runs.
#[derive(Default)]
pub struct ConverterRegistry {
    contextual: HashMap<TypeId, ContextualConverter>,
    families: HashMap<TypeId, PolymorphicFamily>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contextual<T, D, E>(mut self, decode: D, encode: E) -> Self
    where
        T: Any,
        D: Fn(&mut Decoder<'_>) -> Result<T, ConvertError> + Send + Sync + 'static,
        E: Fn(&T, &mut Encoder<'_>) -> Result<(), ConvertError> + Send + Sync + 'static,
    {
        self.contextual.insert(
            TypeId::of::<T>(),
            ContextualConverter {
                decode: Box::new(move |decoder: &mut Decoder<'_>| {
                    decode(decoder).map(|value| Box::new(value) as Box<dyn Any>)
                }),
                encode: Box::new(move |value: &dyn Any, encoder: &mut Encoder<'_>| {
                    let value = value.downcast_ref::<T>().ok_or_else(|| {
                        ConvertError::new(
                            "CONVERT_CONTEXTUAL_TYPE",
                            format!(
                                "Contextual converter for '{}' received a different type.",
                                short_type_name::<T>()
                            ),
                        )
                    })?;
                    encode(value, encoder)
                }),
            },
        );
        self
    }

    pub fn with_family<T: Any>(mut self, family: PolymorphicFamily) -> Self {
        self.families.insert(TypeId::of::<T>(), family);
        self
    }

    pub(crate) fn contextual_for(&self, type_id: TypeId) -> Option<&ContextualConverter> {
        self.contextual.get(&type_id)
    }

    pub(crate) fn family_for(&self, type_id: TypeId) -> Option<&PolymorphicFamily> {
        self.families.get(&type_id)
    }
}

/// Display name of a type: the path and generic arguments stripped, which is
/// what conversion errors surface to callers.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
