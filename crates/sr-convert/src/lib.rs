pub mod access;
pub mod builder;
pub mod convert;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod entries;
pub mod numeric;
pub mod registry;

use rhai::Dynamic;
use sr_core::ConvertError;

pub use convert::Convert;
pub use cursor::ElementIndex;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use registry::{ConverterRegistry, PolymorphicFamily};

/// Structural nesting bound for both drivers; exceeding it is a fatal
/// conversion error rather than stack exhaustion.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Decodes a dynamic value into `T` against the given registry. The value
/// is only borrowed for the duration of the call; a failed decode leaves no
/// caller-visible state behind.
pub fn from_script<T: Convert>(
    value: &Dynamic,
    registry: &ConverterRegistry,
) -> Result<T, ConvertError> {
    let mut decoder = Decoder::new(value.clone(), registry);
    decoder.decode_value::<T>()
}

/// Encodes `value` into a freshly constructed dynamic value against the
/// given registry.
pub fn to_script<T: Convert>(
    value: &T,
    registry: &ConverterRegistry,
) -> Result<Dynamic, ConvertError> {
    let mut encoder = Encoder::new(registry);
    encoder.encode_value(value)?;
    encoder.finish()
}
