//! # Coercion Error Types
//!
//! Behavior functions receive untyped payloads. When a payload cannot be read
//! as the value a behavior expects, the [`coerce`](crate::coerce) helpers
//! return a [`CoerceError`] naming the value that was expected.
//! Most behaviors simply fall back to a default:
//!
//! ```rust
//! use wren_api::coerce;
//!
//! let value = coerce::to_int(&"spawn").unwrap_or(0);
//! assert_eq!(value, 0);
//! ```

use thiserror::Error;

/// Failure to read an untyped payload as a concrete value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    /// The payload has a type the helper does not know how to convert.
    #[error("payload cannot be coerced into {expected}")]
    TypeMismatch { expected: &'static str },

    /// The payload is textual but does not parse as the expected value.
    #[error("cannot parse {input:?} as {expected}")]
    Parse {
        expected: &'static str,
        input: String,
    },

    /// The payload is numeric but does not fit the expected value.
    #[error("value out of range for {expected}")]
    OutOfRange { expected: &'static str },
}
