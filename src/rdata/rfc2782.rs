//! Record data from [RFC 2782]: SRV records.
//!
//! This RFC defines the Srv record type.
//!
//! [RFC 2782]: https://tools.ietf.org/html/rfc2782

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::scan::{Scan, ScanError, Scanner};
use crate::rdata::RecordData;
use core::fmt;

//------------ Srv ---------------------------------------------------------

/// SRV record data.
///
/// The SRV record specifies the location of the server(s) for a specific
/// protocol and domain.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Srv {
    priority: u16,
    weight: u16,
    port: u16,
    target: Name,
}

impl Srv {
    pub fn new(priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Srv {
            priority,
            weight,
            port,
            target,
        }
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target(&self) -> &Name {
        &self.target
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        Ok(Self::new(
            u16::scan(scanner)?,
            u16::scan(scanner)?,
            u16::scan(scanner)?,
            scanner.scan_name()?,
        ))
    }
}

//--- RecordData

impl RecordData for Srv {
    fn rtype(&self) -> Rtype {
        Rtype::SRV
    }

    fn to_lowercase(&self) -> Self {
        Srv {
            target: self.target.to_lowercase(),
            ..self.clone()
        }
    }
}

//--- Display

impl fmt::Display for Srv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

//============ Testing =======================================================
