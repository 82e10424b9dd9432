//! # Wren API
//!
//! Shared vocabulary for the wren actor runtime.
//!
//! Actors in wren exchange fully untyped messages. This crate defines what a
//! message is ([`BoxedMessage`]), how an actor is identified ([`ActorId`]) and
//! the [`coerce`] helpers that behavior functions use to turn an opaque payload
//! back into a concrete value.
//!
//! ```rust
//! use wren_api::{coerce, BoxedMessage};
//!
//! let msg: BoxedMessage = Box::new(42u8);
//! assert_eq!(coerce::to_int(msg.as_ref()).unwrap(), 42);
//! assert_eq!(coerce::to_int_or(&"nope", -1), -1);
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: message and identity types
//! - [`errors`]: coercion errors
//! - [`coerce`]: payload to value conversion

pub mod coerce;
pub mod errors;
pub mod types;

pub use errors::CoerceError;
pub use types::{ActorId, BoxedMessage};
