//! Reading of zonefiles.
//!
//! The [`Zonefile`] scanner reads the textual zone format of [RFC 1035],
//! section 5, and produces the [records][crate::base::Record] it contains.
//! It understands the `$ORIGIN`, `$TTL`, and `$INCLUDE` directives, entries
//! spanning several lines through parentheses, quoted strings, comments,
//! and the escape sequences of names and character strings.
//!
//! Included files are read and scanned in place, so the scanner only ever
//! hands out records.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

pub use self::error::Error;
pub use self::reader::Zonefile;

mod error;
mod reader;
mod source;
