//! Resource data implementations.
//!
//! This module contains implementations for the record data of the record
//! types the zone engine needs to look into: the types that carry domain
//! names the engine follows (NS, CNAME, DNAME, MX, SRV, PTR), the apex
//! SOA, address records used as glue, TXT, and the DNSSEC types RRSIG and
//! NSEC. The data of all other record types is kept in its presentation
//! format as [`UnknownRecordData`].
//!
//! The types are named identically to the [`Rtype`] constant they
//! implement. They are grouped into submodules for the RFCs they are
//! defined in. All types are also re-exported at the top level here.
//!
//! The [`ZoneRecordData`] enum collects all these types and is what a
//! [`Record`][crate::base::Record] carries.

pub use self::rfc1035::{Cname, Mx, Ns, Ptr, Soa, Txt, A};
pub use self::rfc2782::Srv;
pub use self::rfc3596::Aaaa;
pub use self::rfc4034::{Nsec, Rrsig, RtypeBitmap};
pub use self::rfc6672::Dname;
pub use self::unknown::UnknownRecordData;

#[macro_use]
mod macros;

pub mod rfc1035;
pub mod rfc2782;
pub mod rfc3596;
pub mod rfc4034;
pub mod rfc6672;
mod unknown;

use crate::base::iana::Rtype;
use crate::base::scan::{ScanError, Scanner};

//------------ RecordData ----------------------------------------------------

/// A type that represents record data.
pub trait RecordData: Clone {
    /// Returns the record type associated with this record data instance.
    fn rtype(&self) -> Rtype;

    /// Returns a copy with all embedded domain names lowercased.
    ///
    /// Only the record types whose canonical form lowercases names need
    /// to override this.
    fn to_lowercase(&self) -> Self {
        self.clone()
    }
}

//------------ ZoneRecordData ------------------------------------------------

zone_record_data! {
    A => A,
    AAAA => Aaaa,
    CNAME => Cname,
    DNAME => Dname,
    MX => Mx,
    NS => Ns,
    NSEC => Nsec,
    PTR => Ptr,
    RRSIG => Rrsig,
    SOA => Soa,
    SRV => Srv,
    TXT => Txt,
}

impl ZoneRecordData {
    /// Returns the SOA data if this is a SOA record.
    pub fn as_soa(&self) -> Option<&Soa> {
        match *self {
            ZoneRecordData::Soa(ref soa) => Some(soa),
            _ => None,
        }
    }

    /// Returns the RRSIG data if this is an RRSIG record.
    pub fn as_rrsig(&self) -> Option<&Rrsig> {
        match *self {
            ZoneRecordData::Rrsig(ref rrsig) => Some(rrsig),
            _ => None,
        }
    }
}

//============ Testing =======================================================
