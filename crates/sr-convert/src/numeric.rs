//! Narrowing out of the interpreter's native double-precision
//! representation. The 64-bit cast truncates toward zero; the narrower
//! integer widths then wrap (two's complement), they do not saturate.

pub fn to_i64(value: f64) -> i64 {
    value as i64
}

pub fn to_i32(value: f64) -> i32 {
    (value as i64) as i32
}

pub fn to_i16(value: f64) -> i16 {
    (value as i64) as i16
}

pub fn to_i8(value: f64) -> i8 {
    (value as i64) as i8
}

pub fn to_f32(value: f64) -> f32 {
    value as f32
}

/// Integer code-point cast. `None` for values outside the valid scalar
/// range (surrogates, > 0x10FFFF).
pub fn to_char(value: f64) -> Option<char> {
    char::from_u32((value as i64) as u32)
}
