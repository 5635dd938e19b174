//! Record data of record types not interpreted by the zone engine.
//!
//! This is a private module. It’s content is re-exported by the parent.

use crate::base::iana::Rtype;
use crate::base::scan::{ScanError, Scanner};
use crate::rdata::RecordData;
use core::fmt;

//------------ UnknownRecordData ---------------------------------------------

/// The data of a record type the zone engine does not look into.
///
/// The record data is kept in its presentation format with the tokens
/// separated by a single space. This covers both types with a known but
/// uninterpreted presentation format, such as DNSKEY or DS, and the generic
/// `\# <len> <hex>` format of [RFC 3597].
///
/// [RFC 3597]: https://tools.ietf.org/html/rfc3597
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnknownRecordData {
    rtype: Rtype,
    data: String,
}

impl UnknownRecordData {
    /// Creates record data from its type and presentation format.
    pub fn new(rtype: Rtype, data: impl Into<String>) -> Self {
        UnknownRecordData {
            rtype,
            data: data.into(),
        }
    }

    /// Returns the record data in presentation format.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Scans the remaining tokens of the entry.
    pub fn scan<S: Scanner + ?Sized>(
        rtype: Rtype,
        scanner: &mut S,
    ) -> Result<Self, ScanError> {
        let tokens = scanner.scan_remaining()?;
        if tokens.is_empty() {
            return Err(ScanError::end_of_entry());
        }
        let data = tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Self::new(rtype, data))
    }
}

//--- RecordData

impl RecordData for UnknownRecordData {
    fn rtype(&self) -> Rtype {
        self.rtype
    }
}

//--- Display

impl fmt::Display for UnknownRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.data)
    }
}

//============ Testing =======================================================
