//! Domain name labels.
//!
//! This is a private module. Its public types are re-exported by the parent
//! module.

use core::{cmp, fmt, hash};

//------------ Label ---------------------------------------------------------

/// A normal label of a domain name.
///
/// A label is a sequence of up to 63 octets. While label content is
/// conventionally restricted to letters, digits and the hyphen, any octet
/// value is allowed. Labels are compared ignoring ASCII case.
///
/// The type is a thin wrapper around the label’s octets without the
/// leading length octet.
#[derive(Clone, Copy)]
pub struct Label<'a>(&'a [u8]);

/// # Creation
///
impl<'a> Label<'a> {
    /// The maximum number of octets in a label.
    pub const MAX_LEN: usize = 63;

    /// Creates a label from its content.
    ///
    /// Returns an error if the slice is longer than 63 octets.
    pub fn from_slice(slice: &'a [u8]) -> Result<Self, LongLabelError> {
        if slice.len() > Self::MAX_LEN {
            Err(LongLabelError(()))
        } else {
            Ok(Label(slice))
        }
    }

    /// Creates a label from a slice already known to be short enough.
    pub(super) fn from_slice_unchecked(slice: &'a [u8]) -> Self {
        Label(slice)
    }
}

/// # Content
///
impl<'a> Label<'a> {
    /// Returns the label’s content.
    #[must_use]
    pub fn as_slice(self) -> &'a [u8] {
        self.0
    }

    /// Returns the number of content octets.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.len()
    }

    /// Returns whether this is the empty root label.
    #[must_use]
    pub fn is_root(self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether this is the wildcard label `*`.
    #[must_use]
    pub fn is_wildcard(self) -> bool {
        self.0 == b"*"
    }

    /// Returns an iterator over the octets of the label.
    pub fn iter(self) -> impl Iterator<Item = u8> + 'a {
        self.0.iter().copied()
    }

    /// Returns an iterator over the lowercased octets of the label.
    fn iter_lowercase(self) -> impl Iterator<Item = u8> + 'a {
        self.0.iter().map(u8::to_ascii_lowercase)
    }
}

//--- PartialEq and Eq

impl PartialEq for Label<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl Eq for Label<'_> {}

//--- PartialOrd and Ord

/// Labels are ordered as octet sequences with ASCII letters lowercased.
///
/// This is the ordering required for canonical name order by
/// [RFC 4034](https://tools.ietf.org/html/rfc4034#section-6.1).
impl PartialOrd for Label<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label<'_> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.iter_lowercase().cmp(other.iter_lowercase())
    }
}

//--- Hash

impl hash::Hash for Label<'_> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        state.write_u8(self.0.len() as u8);
        for ch in self.iter_lowercase() {
            state.write_u8(ch)
        }
    }
}

//--- Display and Debug

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in self.iter() {
            if ch == b' ' || ch == b'.' || ch == b'\\' {
                write!(f, "\\{}", ch as char)?;
            } else if !(0x20..0x7F).contains(&ch) {
                write!(f, "\\{:03}", ch)?;
            } else {
                write!(f, "{}", (ch as char))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Label(")?;
        fmt::Display::fmt(self, f)?;
        f.write_str(")")
    }
}

//------------ LongLabelError ------------------------------------------------

/// A label was longer than the allowed 63 octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LongLabelError(());

//--- Display and Error

impl fmt::Display for LongLabelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("long label")
    }
}

impl std::error::Error for LongLabelError {}

//============ Testing =======================================================
