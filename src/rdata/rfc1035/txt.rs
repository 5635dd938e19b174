//! Record data for the TXT record.
//!
//! This is a private module. It’s content is re-exported by the parent.

use crate::base::iana::Rtype;
use crate::base::scan::{ScanError, Scanner, Symbol};
use crate::rdata::RecordData;
use bytes::Bytes;
use core::fmt;

//------------ Txt ----------------------------------------------------------

/// TXT record data.
///
/// TXT records hold descriptive text. While it may appear as a single text,
/// it internally consists of a sequence of one or more character strings,
/// each at most 255 octets long.
///
/// The TXT record type is defined in [RFC 1035, section 3.3.14].
///
/// # Presentation format
///
/// TXT record data appears in zone files as the white-space delimited
/// sequence of its constituent character strings. This means that
/// if these strings are not quoted, each “word” results in a character string
/// of its own. Thus, the quoted form of the character string’s presentation
/// format is preferred.
///
/// # `Display`
///
/// The `Display` implementation prints the sequence of character strings in
/// their quoted presentation format separated by a single space.
///
/// [RFC 1035, section 3.3.14]: https://tools.ietf.org/html/rfc1035#section-3.3.14
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Txt(Vec<Bytes>);

impl Txt {
    /// Creates TXT record data from a sequence of character strings.
    ///
    /// Returns `None` if there is no string or one of the strings is longer
    /// than 255 octets.
    pub fn from_charstrs(charstrs: Vec<Bytes>) -> Option<Self> {
        if charstrs.is_empty() || charstrs.iter().any(|s| s.len() > 255) {
            None
        } else {
            Some(Txt(charstrs))
        }
    }

    /// Creates TXT record data from a single string.
    ///
    /// Text longer than 255 octets is split into several character strings.
    pub fn build_from_slice(text: &[u8]) -> Self {
        if text.is_empty() {
            return Txt(vec![Bytes::new()]);
        }
        Txt(text.chunks(255).map(Bytes::copy_from_slice).collect())
    }

    /// Returns an iterator over the character strings.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.0.iter().map(AsRef::as_ref)
    }

    /// Returns the concatenated content of all character strings.
    pub fn text(&self) -> Vec<u8> {
        self.0.concat()
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        let mut res = vec![scanner.scan_charstr()?];
        while scanner.continues() {
            res.push(scanner.scan_charstr()?);
        }
        Ok(Txt(res))
    }
}

//--- RecordData

impl RecordData for Txt {
    fn rtype(&self) -> Rtype {
        Rtype::TXT
    }
}

//--- Display and Debug

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for slice in self.iter() {
            if !first {
                f.write_str(" ")?;
            } else {
                first = false;
            }
            f.write_str("\"")?;
            for &ch in slice {
                if ch == b' ' {
                    f.write_str(" ")?;
                } else {
                    write!(f, "{}", Symbol::from_octet(ch))?;
                }
            }
            f.write_str("\"")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Txt(")?;
        fmt::Display::fmt(self, f)?;
        f.write_str(")")
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::test_scan;

    #[test]
    fn txt_scan_and_display() {
        let rdata = Txt::from_charstrs(vec![
            Bytes::from_static(b"v=spf1"),
            Bytes::from_static(b"a \"b\""),
        ])
        .unwrap();
        test_scan(&["v=spf1", "a\\ \\\"b\\\""], Txt::scan, &rdata);
        assert_eq!(rdata.to_string(), "\"v=spf1\" \"a \\\"b\\\"\"");
        assert_eq!(rdata.text(), b"v=spf1a \"b\"");
    }

    #[test]
    fn build_long_text() {
        let txt = Txt::build_from_slice(&[b'x'; 300]);
        assert_eq!(txt.iter().count(), 2);
        assert_eq!(txt.text().len(), 300);
        assert!(Txt::from_charstrs(vec![]).is_none());
    }
}
