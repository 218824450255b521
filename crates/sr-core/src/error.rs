use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ConvertError {
    pub code: String,
    pub message: String,
}

impl ConvertError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn missing_serializer(type_name: &str) -> Self {
        Self::new(
            "CONVERT_SERIALIZER_MISSING",
            format!(
                "Serializer for class '{}' is not found.\nMark the class as serializable or provide the serializer explicitly.",
                type_name
            ),
        )
    }

    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::new(
            "CONVERT_TYPE_MISMATCH",
            format!("Expected {} value, found {}.", expected, actual),
        )
    }

    pub fn unknown_discriminant(discriminant: &str, family: &str) -> Self {
        Self::new(
            "CONVERT_DISCRIMINANT_UNKNOWN",
            format!(
                "No concrete type is registered for discriminant \"{}\" in family \"{}\".",
                discriminant, family
            ),
        )
    }

    pub fn depth_exceeded(limit: usize) -> Self {
        Self::new(
            "CONVERT_DEPTH_EXCEEDED",
            format!("Value nesting exceeds the supported depth of {}.", limit),
        )
    }
}
