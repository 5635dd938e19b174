//! Uncompressed, absolute domain names.
//!
//! This is a private module. Its public types are re-exported by the parent.

use super::label::{Label, LongLabelError};
use bytes::{BufMut, Bytes, BytesMut};
use core::{cmp, fmt, hash, str};

//------------ Name ----------------------------------------------------------

/// An uncompressed, absolute domain name.
///
/// The name is kept in its wire-format representation, i.e., as a sequence
/// of labels each prefixed by a length octet and ending in the empty root
/// label. The octets are held in a [`Bytes`] value, so cloning a name or
/// taking one of its suffixes is cheap.
///
/// Names compare and hash ignoring ASCII case. The `Ord` implementation
/// provides the canonical order defined in [RFC 4034]: labels are compared
/// starting from the root end, each as an octet sequence with ASCII letters
/// lowercased, and a name sorts before all names it is a suffix of.
///
/// A name can be created from its presentation format via `FromStr`. In
/// that case, escape sequences of the form `\DDD` and `\X` are decoded into
/// the raw octet they represent. A name without a final dot is considered
/// absolute anyway. Use [`Name::from_presentation`] if a relative name
/// should be attached to an origin.
///
/// [RFC 4034]: https://tools.ietf.org/html/rfc4034#section-6.1
#[derive(Clone)]
pub struct Name(Bytes);

/// # Creation
///
impl Name {
    /// The maximum length of a domain name in wire format.
    pub const MAX_LEN: usize = 255;

    /// Returns the root name.
    #[must_use]
    pub fn root() -> Self {
        Name(Bytes::from_static(b"\0"))
    }

    /// Creates a name from its wire-format representation.
    ///
    /// The octets must contain exactly one uncompressed absolute name.
    pub fn from_octets(octets: Bytes) -> Result<Self, NameError> {
        Self::check_slice(octets.as_ref())?;
        Ok(Name(octets))
    }

    /// Creates a name from a wire-format slice, copying the octets.
    pub fn from_slice(slice: &[u8]) -> Result<Self, NameError> {
        Self::check_slice(slice)?;
        Ok(Name(Bytes::copy_from_slice(slice)))
    }

    /// Creates a name from its presentation format.
    ///
    /// If the string does not end in a dot, the name is relative and
    /// `origin` is appended to it. If no origin is given, such a name is
    /// taken as absolute. The string `"."` is the root name.
    pub fn from_presentation(
        s: &str,
        origin: Option<&Name>,
    ) -> Result<Self, NameError> {
        use self::NameErrorEnum::*;

        if s.is_empty() {
            return Err(NameError(EmptyLabel));
        }
        if s == "." {
            return Ok(Self::root());
        }

        let mut buf = BytesMut::with_capacity(s.len() + 2);
        let mut label_start = 0;
        buf.put_u8(0);
        let mut chars = s.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    let len = buf.len() - label_start - 1;
                    if len == 0 {
                        return Err(NameError(EmptyLabel));
                    }
                    buf[label_start] = len as u8;
                    label_start = buf.len();
                    buf.put_u8(0);
                }
                '\\' => buf.put_u8(parse_escape(&mut chars)?),
                ch if ch.is_ascii() && !ch.is_ascii_control() => {
                    buf.put_u8(ch as u8)
                }
                _ => return Err(NameError(IllegalCharacter)),
            }
            if buf.len() - label_start - 1 > Label::MAX_LEN {
                return Err(NameError(LongLabel));
            }
        }

        // A final dot leaves an empty label which becomes the root label.
        let len = buf.len() - label_start - 1;
        if len != 0 {
            buf[label_start] = len as u8;
            match origin {
                Some(origin) => buf.extend_from_slice(origin.as_slice()),
                None => buf.put_u8(0),
            }
        }
        if buf.len() > Self::MAX_LEN {
            return Err(NameError(LongName));
        }
        Ok(Name(buf.freeze()))
    }

    /// Checks that a slice contains exactly one absolute name.
    fn check_slice(mut slice: &[u8]) -> Result<(), NameError> {
        use self::NameErrorEnum::*;

        if slice.len() > Self::MAX_LEN {
            return Err(NameError(LongName));
        }
        loop {
            let (&len, tail) =
                slice.split_first().ok_or(NameError(ShortInput))?;
            let len = usize::from(len);
            if len > Label::MAX_LEN {
                return Err(NameError(BadLabel));
            }
            if len == 0 {
                return if tail.is_empty() {
                    Ok(())
                } else {
                    Err(NameError(TrailingData))
                };
            }
            if tail.len() < len {
                return Err(NameError(ShortInput));
            }
            slice = &tail[len..];
        }
    }
}

/// # Properties and Labels
///
impl Name {
    /// Returns the wire-format octets of the name.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns a reference to the underlying bytes value.
    #[must_use]
    pub fn as_octets(&self) -> &Bytes {
        &self.0
    }

    /// Returns the length of the wire-format representation.
    #[allow(clippy::len_without_is_empty)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether this is the root name.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The root label is not included. The iterator can be reversed to
    /// walk from the most significant label.
    #[must_use]
    pub fn iter_labels(&self) -> Labels<'_> {
        Labels::new(self.as_slice())
    }

    /// Returns the number of labels, not counting the root label.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.iter_labels().len()
    }

    /// Returns the first, least significant label.
    #[must_use]
    pub fn first_label(&self) -> Option<Label<'_>> {
        self.iter_labels().next()
    }

    /// Returns whether the first label is the wildcard label.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.first_label().map_or(false, Label::is_wildcard)
    }

    /// Returns whether `base` is a suffix of this name.
    ///
    /// Every name ends with itself and with the root.
    #[must_use]
    pub fn ends_with(&self, base: &Name) -> bool {
        let mut labels = self.iter_labels().rev();
        for base_label in base.iter_labels().rev() {
            match labels.next() {
                Some(label) if label == base_label => {}
                _ => return false,
            }
        }
        true
    }

    /// Returns whether this name is strictly below `base`.
    #[must_use]
    pub fn is_below(&self, base: &Name) -> bool {
        self.label_count() > base.label_count() && self.ends_with(base)
    }
}

/// # Derived Names
///
impl Name {
    /// Returns the parent of the name or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Name> {
        let len = usize::from(*self.0.first()?);
        if len == 0 {
            None
        } else {
            Some(Name(self.0.slice(len + 1..)))
        }
    }

    /// Returns the name made of the last `count` labels.
    ///
    /// If the name has `count` labels or fewer, the whole name is returned.
    #[must_use]
    pub fn suffix(&self, count: usize) -> Name {
        let labels = self.iter_labels();
        let total = labels.len();
        if count >= total {
            return self.clone();
        }
        Name(self.0.slice(labels.offset(total - count)..))
    }

    /// Returns a new name with `label` prepended to this name.
    pub fn prepend(&self, label: &[u8]) -> Result<Name, NameError> {
        let label = Label::from_slice(label)?;
        if label.is_root() {
            return Err(NameError(NameErrorEnum::EmptyLabel));
        }
        if self.len() + label.len() + 1 > Self::MAX_LEN {
            return Err(NameError(NameErrorEnum::LongName));
        }
        let mut buf = BytesMut::with_capacity(self.len() + label.len() + 1);
        buf.put_u8(label.len() as u8);
        buf.extend_from_slice(label.as_slice());
        buf.extend_from_slice(self.as_slice());
        Ok(Name(buf.freeze()))
    }

    /// Returns the wildcard name directly below this name.
    pub fn wildcard(&self) -> Result<Name, NameError> {
        self.prepend(b"*")
    }

    /// Replaces the suffix `old` of the name with `new`.
    ///
    /// This is the name substitution of DNAME records. Fails if `old` isn’t
    /// a suffix or the result is too long.
    pub fn replace_suffix(
        &self,
        old: &Name,
        new: &Name,
    ) -> Result<Name, NameError> {
        if !self.ends_with(old) {
            return Err(NameError(NameErrorEnum::NotSuffix));
        }
        let prefix = &self.as_slice()[..self.len() - old.len()];
        if prefix.len() + new.len() > Self::MAX_LEN {
            return Err(NameError(NameErrorEnum::LongName));
        }
        let mut buf = BytesMut::with_capacity(prefix.len() + new.len());
        buf.extend_from_slice(prefix);
        buf.extend_from_slice(new.as_slice());
        Ok(Name(buf.freeze()))
    }

    /// Returns the name with all ASCII letters lowercased.
    #[must_use]
    pub fn to_lowercase(&self) -> Name {
        // Length octets never exceed 63 and are left alone.
        if !self.0.iter().any(u8::is_ascii_uppercase) {
            return self.clone();
        }
        Name(Bytes::from(self.0.to_ascii_lowercase()))
    }
}

//--- FromStr

impl str::FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_presentation(s, None)
    }
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice().eq_ignore_ascii_case(other.as_slice())
    }
}

impl Eq for Name {}

impl hash::Hash for Name {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for ch in self.as_slice() {
            state.write_u8(ch.to_ascii_lowercase())
        }
    }
}

//--- PartialOrd and Ord

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        let mut self_iter = self.iter_labels();
        let mut other_iter = other.iter_labels();
        loop {
            match (self_iter.next_back(), other_iter.next_back()) {
                (Some(left), Some(right)) => match left.cmp(&right) {
                    cmp::Ordering::Equal => {}
                    res => return res,
                },
                (None, Some(_)) => return cmp::Ordering::Less,
                (Some(_), None) => return cmp::Ordering::Greater,
                (None, None) => return cmp::Ordering::Equal,
            }
        }
    }
}

//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for label in self.iter_labels() {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//------------ Labels --------------------------------------------------------

/// An iterator over the labels of a name.
///
/// The root label is not included.
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    slice: &'a [u8],

    /// The start offsets of all non-root labels.
    ///
    /// A name has at most 127 non-root labels and every offset is below
    /// 255, so this always fits.
    offsets: [u8; 128],

    front: usize,
    back: usize,
}

impl<'a> Labels<'a> {
    fn new(slice: &'a [u8]) -> Self {
        let mut offsets = [0u8; 128];
        let mut count = 0;
        let mut pos = 0;
        while let Some(&len) = slice.get(pos) {
            if len == 0 || count == offsets.len() {
                break;
            }
            offsets[count] = pos as u8;
            count += 1;
            pos += usize::from(len) + 1;
        }
        Labels {
            slice,
            offsets,
            front: 0,
            back: count,
        }
    }

    /// Returns the offset of the label with the given index.
    fn offset(&self, index: usize) -> usize {
        usize::from(self.offsets[index])
    }

    fn label_at(&self, index: usize) -> Label<'a> {
        let start = self.offset(index);
        let len = usize::from(self.slice[start]);
        Label::from_slice_unchecked(&self.slice[start + 1..start + 1 + len])
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let res = self.label_at(self.front);
        self.front += 1;
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.label_at(self.back))
    }
}

impl ExactSizeIterator for Labels<'_> {}

//------------ Helper Functions ----------------------------------------------

/// Parses the remainder of an escape sequence after the backslash.
fn parse_escape(chars: &mut str::Chars) -> Result<u8, NameError> {
    let bad = NameError(NameErrorEnum::BadEscape);
    let ch = chars.next().ok_or(bad)?;
    if let Some(first) = ch.to_digit(10) {
        let second = chars.next().and_then(|ch| ch.to_digit(10)).ok_or(bad)?;
        let third = chars.next().and_then(|ch| ch.to_digit(10)).ok_or(bad)?;
        let res = first * 100 + second * 10 + third;
        u8::try_from(res).map_err(|_| bad)
    } else if ch.is_ascii() && !ch.is_ascii_control() {
        Ok(ch as u8)
    } else {
        Err(bad)
    }
}

//============ Error Types ===================================================

//------------ NameError -----------------------------------------------------

/// A domain name wasn’t encoded correctly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NameError(NameErrorEnum);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum NameErrorEnum {
    /// The wire format contained a label type other than a normal label.
    BadLabel,

    /// A label was longer than 63 octets.
    LongLabel,

    /// The name was longer than 255 octets.
    LongName,

    /// The presentation format contained an empty label.
    EmptyLabel,

    /// An illegal escape sequence was encountered.
    BadEscape,

    /// A non-ASCII or control character was encountered.
    IllegalCharacter,

    /// The input ended in the middle of a label.
    ShortInput,

    /// There was more data after the root label was encountered.
    TrailingData,

    /// A suffix to be replaced was not a suffix of the name.
    NotSuffix,
}

//--- From

impl From<LongLabelError> for NameError {
    fn from(_: LongLabelError) -> Self {
        NameError(NameErrorEnum::LongLabel)
    }
}

//--- Display and Error

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self.0 {
            NameErrorEnum::BadLabel => "unknown label type",
            NameErrorEnum::LongLabel => "long label",
            NameErrorEnum::LongName => "long domain name",
            NameErrorEnum::EmptyLabel => "empty label",
            NameErrorEnum::BadEscape => "illegal escape sequence",
            NameErrorEnum::IllegalCharacter => "illegal character",
            NameErrorEnum::ShortInput => "unexpected end of input",
            NameErrorEnum::TrailingData => "trailing data",
            NameErrorEnum::NotSuffix => "suffix not present in name",
        })
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn from_presentation() {
        assert_eq!(name("www.example.com.").as_slice(),
                   b"\x03www\x07example\x03com\x00");
        assert_eq!(name("www.example.com").as_slice(),
                   b"\x03www\x07example\x03com\x00");
        assert_eq!(name(".").as_slice(), b"\x00");
        assert_eq!(name("a\\.b.c.").label_count(), 2);
        assert_eq!(name("\\065\\066.").as_slice(), b"\x02AB\x00");

        let origin = name("example.com.");
        assert_eq!(
            Name::from_presentation("www", Some(&origin)).unwrap(),
            name("www.example.com.")
        );
        assert_eq!(
            Name::from_presentation("www.", Some(&origin)).unwrap(),
            name("www.")
        );

        assert!("".parse::<Name>().is_err());
        assert!("a..b.".parse::<Name>().is_err());
        assert!("..".parse::<Name>().is_err());
        assert!("a\\25".parse::<Name>().is_err());
        assert!("a\\256".parse::<Name>().is_err());
        assert!(format!("{}.", "a".repeat(64)).parse::<Name>().is_err());
        assert!(format!("{}.", "a.".repeat(128)).parse::<Name>().is_err());
    }

    #[test]
    fn from_slice() {
        assert!(Name::from_slice(b"\x03www\x00").is_ok());
        assert!(Name::from_slice(b"\x03www").is_err());
        assert!(Name::from_slice(b"\x03www\x00\x00").is_err());
        assert!(Name::from_slice(b"\xc0\x0c").is_err());
        assert!(Name::from_slice(b"").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(name("www.example.com").to_string(), "www.example.com.");
        assert_eq!(Name::root().to_string(), ".");
        assert_eq!(name("a\\.b.c.").to_string(), "a\\.b.c.");
        assert_eq!(name("\\000.c.").to_string(), "\\000.c.");
    }

    #[test]
    fn eq_and_hash_ignore_case() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = name("WWW.Example.COM.");
        let b = name("www.example.com.");
        assert_eq!(a, b);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
        assert_ne!(name("www.example.com."), name("www.example.org."));
    }

    #[test]
    fn canonical_order() {
        let mut names = vec![
            name("a.example."),
            name("Z.a.example."),
            name("z.example."),
            name("example."),
        ];
        names.sort();
        let sorted: Vec<_> = names.iter().map(ToString::to_string).collect();
        assert_eq!(
            sorted,
            ["example.", "a.example.", "Z.a.example.", "z.example."]
        );

        // The RFC 4034 example.
        let ordered = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ];
        for pair in ordered.windows(2) {
            assert!(name(pair[0]) < name(pair[1]), "{:?}", pair);
        }
        assert!(name("com.") < name("example.net."));
    }

    #[test]
    fn labels_and_suffixes() {
        let n = name("a.b.c.miek.nl.");
        assert_eq!(n.label_count(), 5);
        assert_eq!(Name::root().label_count(), 0);
        assert_eq!(n.suffix(2), name("miek.nl."));
        assert_eq!(n.suffix(0), Name::root());
        assert_eq!(n.suffix(9), n);
        assert_eq!(n.parent().unwrap(), name("b.c.miek.nl."));
        assert!(Name::root().parent().is_none());
        let rev: Vec<_> =
            n.iter_labels().rev().map(|l| l.to_string()).collect();
        assert_eq!(rev, ["nl", "miek", "c", "b", "a"]);
    }

    #[test]
    fn ends_with() {
        let n = name("www.Example.com.");
        assert!(n.ends_with(&name("example.com.")));
        assert!(n.ends_with(&n));
        assert!(n.ends_with(&Name::root()));
        assert!(!n.ends_with(&name("ample.com.")));
        assert!(n.is_below(&name("example.com.")));
        assert!(!n.is_below(&n));
    }

    #[test]
    fn derived_names() {
        let n = name("example.org.");
        assert_eq!(n.wildcard().unwrap(), name("*.example.org."));
        assert!(n.wildcard().unwrap().is_wildcard());
        assert!(!n.is_wildcard());
        assert_eq!(
            name("a.b.dname.example.org.")
                .replace_suffix(
                    &name("dname.example.org."),
                    &name("other.net.")
                )
                .unwrap(),
            name("a.b.other.net.")
        );
        assert!(n.replace_suffix(&name("net."), &n).is_err());
        assert_eq!(
            name("WwW.ExAmple.").to_lowercase().as_slice(),
            b"\x03www\x07example\x00"
        );
    }
}
