use chrono::{DateTime, TimeZone, Utc};

pub use sr_core::{ConvertError, Descriptor, DescriptorKind};
pub use sr_convert::{
    from_script, to_script, Convert, ConverterRegistry, Decoder, ElementIndex, Encoder,
    PolymorphicFamily, MAX_NESTING_DEPTH,
};

/// Registry preloaded with the converters host projects expect out of the
/// box: timestamps travel as integer epoch milliseconds. Start from
/// [`ConverterRegistry::new`] instead when the strict behavior is wanted —
/// decoding a timestamp field against an empty registry is a fatal
/// missing-serializer error.
pub fn default_registry() -> ConverterRegistry {
    ConverterRegistry::new().with_contextual::<DateTime<Utc>, _, _>(
        |decoder| {
            let millis = decoder.decode_i64()?;
            Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                ConvertError::new(
                    "CONVERT_TIMESTAMP_RANGE",
                    format!("Value {} is not a representable timestamp.", millis),
                )
            })
        },
        |value, encoder| encoder.encode_i64(value.timestamp_millis()),
    )
}
