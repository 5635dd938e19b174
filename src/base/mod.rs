//! Basics.
//!
//! This module provides the fundamental types for working with DNS zone
//! data: domain names, the IANA-assigned parameters for record types,
//! classes, and response codes, serial numbers, time-to-live values, and
//! resource records.
//!
//! The types are arranged in submodules. The most important types are
//! re-exported here:
//!
//! * [name](name/index.html) for domain names,
//! * [iana](iana/index.html) for record types, classes, and response codes,
//! * [serial](serial/index.html) for serial numbers of zones,
//! * [record](record/index.html) for DNS resource records, and
//! * [scan](scan/index.html) for reading data from its presentation format.

pub use self::iana::{Class, Rcode, Rtype};
pub use self::name::{Name, NameError};
pub use self::record::{Record, Ttl};
pub use self::serial::Serial;

pub mod iana;
pub mod name;
pub mod record;
pub mod scan;
pub mod serial;
