//! Payload coercion.
//!
//! Messages travel as `dyn Any`. These helpers read the common scalar shapes
//! back out: every integer width, floats, booleans and text. A payload that is
//! itself a [`BoxedMessage`] is unwrapped first, so passing `&msg` works the
//! same as passing `msg.as_ref()`.

use std::any::Any;

use crate::errors::CoerceError;
use crate::types::BoxedMessage;

const INT: &str = "i64";
const FLOAT: &str = "f64";
const BOOL: &str = "bool";
const TEXT: &str = "String";

fn unwrap_boxed(value: &dyn Any) -> &dyn Any {
    match value.downcast_ref::<BoxedMessage>() {
        Some(inner) => unwrap_boxed(inner.as_ref()),
        None => value,
    }
}

fn text_of(value: &dyn Any) -> Option<&str> {
    if let Some(s) = value.downcast_ref::<&'static str>() {
        return Some(*s);
    }
    value.downcast_ref::<String>().map(String::as_str)
}

macro_rules! try_int {
    ($value:expr, $($ty:ty),+) => {
        $(
            if let Some(v) = $value.downcast_ref::<$ty>() {
                return i64::try_from(*v).map_err(|_| CoerceError::OutOfRange { expected: INT });
            }
        )+
    };
}

/// Reads the payload as an `i64`.
///
/// Floats are truncated toward zero, booleans map to `1`/`0`, and text is
/// parsed after trimming.
pub fn to_int(value: &dyn Any) -> Result<i64, CoerceError> {
    let value = unwrap_boxed(value);
    try_int!(value, i64, i32, i16, i8, isize, u64, u32, u16, u8, usize, i128, u128);

    if let Some(v) = value.downcast_ref::<f64>() {
        return float_to_int(*v);
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return float_to_int(f64::from(*v));
    }
    if let Some(v) = value.downcast_ref::<bool>() {
        return Ok(i64::from(*v));
    }
    if let Some(text) = text_of(value) {
        return text.trim().parse::<i64>().map_err(|_| CoerceError::Parse {
            expected: INT,
            input: text.to_string(),
        });
    }

    Err(CoerceError::TypeMismatch { expected: INT })
}

fn float_to_int(v: f64) -> Result<i64, CoerceError> {
    if !v.is_finite() || v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err(CoerceError::OutOfRange { expected: INT });
    }
    Ok(v.trunc() as i64)
}

/// Like [`to_int`] but collapses any failure into `fallback`.
pub fn to_int_or(value: &dyn Any, fallback: i64) -> i64 {
    to_int(value).unwrap_or(fallback)
}

/// Reads the payload as an `f64`. Integers widen, text is parsed.
pub fn to_float(value: &dyn Any) -> Result<f64, CoerceError> {
    let value = unwrap_boxed(value);
    if let Some(v) = value.downcast_ref::<f64>() {
        return Ok(*v);
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return Ok(f64::from(*v));
    }
    if let Some(text) = text_of(value) {
        return text.trim().parse::<f64>().map_err(|_| CoerceError::Parse {
            expected: FLOAT,
            input: text.to_string(),
        });
    }
    match to_int(value) {
        Ok(v) => Ok(v as f64),
        Err(CoerceError::OutOfRange { .. }) => Err(CoerceError::OutOfRange { expected: FLOAT }),
        Err(_) => Err(CoerceError::TypeMismatch { expected: FLOAT }),
    }
}

/// Reads the payload as a `bool`. Numbers are true when non-zero; text must
/// be `true` or `false`.
pub fn to_bool(value: &dyn Any) -> Result<bool, CoerceError> {
    let value = unwrap_boxed(value);
    if let Some(v) = value.downcast_ref::<bool>() {
        return Ok(*v);
    }
    if let Some(text) = text_of(value) {
        return text.trim().parse::<bool>().map_err(|_| CoerceError::Parse {
            expected: BOOL,
            input: text.to_string(),
        });
    }
    match to_int(value) {
        Ok(v) => Ok(v != 0),
        Err(_) => Err(CoerceError::TypeMismatch { expected: BOOL }),
    }
}

/// Renders scalar payloads as text. Non-scalar payloads are a mismatch.
pub fn to_text(value: &dyn Any) -> Result<String, CoerceError> {
    let value = unwrap_boxed(value);
    if let Some(text) = text_of(value) {
        return Ok(text.to_string());
    }
    if let Some(v) = value.downcast_ref::<char>() {
        return Ok(v.to_string());
    }
    if let Some(v) = value.downcast_ref::<bool>() {
        return Ok(v.to_string());
    }
    if let Some(v) = value.downcast_ref::<f64>() {
        return Ok(v.to_string());
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return Ok(v.to_string());
    }
    match to_int(value) {
        Ok(v) => Ok(v.to_string()),
        Err(_) => Err(CoerceError::TypeMismatch { expected: TEXT }),
    }
}

/// Borrows the payload as `T` when it is exactly a `T`.
pub fn downcast<T: Any>(value: &dyn Any) -> Option<&T> {
    unwrap_boxed(value).downcast_ref::<T>()
}
