//! Record data from [RFC 3596]: AAAA
//!
//! This RFC defines the Aaaa record type.
//!
//! [RFC 3596]: https://tools.ietf.org/html/rfc3596

use crate::base::iana::Rtype;
use crate::base::scan::{Scan, ScanError, Scanner};
use crate::rdata::RecordData;
use core::{fmt, str};
use std::net::Ipv6Addr;

//------------ Aaaa ---------------------------------------------------------

/// AAAA record data.
///
/// AAAA records convey the IPv6 address of a host.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Aaaa {
    addr: Ipv6Addr,
}

impl Aaaa {
    #[must_use]
    pub fn new(addr: Ipv6Addr) -> Aaaa {
        Aaaa { addr }
    }

    #[must_use]
    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        Ipv6Addr::scan(scanner).map(Self::new)
    }
}

//--- From and FromStr

impl From<Ipv6Addr> for Aaaa {
    fn from(addr: Ipv6Addr) -> Self {
        Self::new(addr)
    }
}

impl From<Aaaa> for Ipv6Addr {
    fn from(data: Aaaa) -> Self {
        data.addr
    }
}

impl str::FromStr for Aaaa {
    type Err = <Ipv6Addr as str::FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv6Addr::from_str(s).map(Aaaa::new)
    }
}

//--- RecordData

impl RecordData for Aaaa {
    fn rtype(&self) -> Rtype {
        Rtype::AAAA
    }
}

//--- Display

impl fmt::Display for Aaaa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.addr, f)
    }
}

//============ Testing =======================================================
