//! IANA Definitions for DNS.
//!
//! This module contains types for parameters defined in IANA registries
//! that are relevant for this crate.
//!
//! All types defined hereunder follow the same basic structure. They wrap
//! the raw integer value and provide associated constants for the
//! well-defined values. There are two methods `from_int()` and `to_int()`
//! to convert from and to raw integer values as well as implementations of
//! the `From` trait for these. `FromStr` and `Display` convert from the
//! string codes to the values and back.
//!
//! While each parameter type has a module of its own, they are all
//! re-exported here.

pub use self::class::Class;
pub use self::rcode::Rcode;
pub use self::rtype::Rtype;

#[macro_use]
mod macros;

pub mod class;
pub mod rcode;
pub mod rtype;
