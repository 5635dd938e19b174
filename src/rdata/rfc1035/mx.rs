//! Record data for the MX record.
//!
//! This is a private module. It’s content is re-exported by the parent.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::scan::{Scan, ScanError, Scanner};
use crate::rdata::RecordData;
use core::fmt;

//------------ Mx -----------------------------------------------------------

/// Mx record data.
///
/// The Mx record specifies a host willing to serve as a mail exchange for
/// the owner name.
///
/// The Mx record type is defined in RFC 1035, section 3.3.9.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Mx {
    preference: u16,
    exchange: Name,
}

impl Mx {
    /// Creates a new Mx record data from the components.
    pub fn new(preference: u16, exchange: Name) -> Self {
        Mx {
            preference,
            exchange,
        }
    }

    /// The preference for this record.
    ///
    /// Defines an order if there are several Mx records for the same owner.
    /// Lower values are preferred.
    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// The name of the host that is the exchange.
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        Ok(Self::new(u16::scan(scanner)?, scanner.scan_name()?))
    }
}

//--- RecordData

impl RecordData for Mx {
    fn rtype(&self) -> Rtype {
        Rtype::MX
    }

    fn to_lowercase(&self) -> Self {
        Self::new(self.preference, self.exchange.to_lowercase())
    }
}

//--- Display

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

//============ Testing =======================================================
