//! Zone related errors.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::serial::Serial;
use crate::zonefile;
use std::fmt;
use std::io;

//------------ ZoneError -----------------------------------------------------

/// Building or changing a zone failed.
#[derive(Debug)]
pub enum ZoneError {
    /// The zone file could not be scanned.
    Scan(zonefile::Error),

    /// The zone file could not be read.
    Io(io::Error),

    /// The record type is not supported by the zone.
    ///
    /// This is the case for the NSEC3 family of records.
    Unsupported {
        /// The owner of the rejected record.
        owner: Name,

        /// The type of the rejected record.
        rtype: Rtype,
    },

    /// The record’s owner is not within the zone.
    OutOfZone {
        /// The owner of the rejected record.
        owner: Name,
    },

    /// The zone file contained no SOA record.
    MissingSoa {
        /// The origin of the zone.
        origin: Name,
    },

    /// The zone’s SOA serial is the one given as current.
    ///
    /// This isn’t really an error but a signal that the zone doesn’t need
    /// to be loaded again.
    Unchanged(Serial),
}

impl ZoneError {
    /// Returns whether the error signals an unchanged zone.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, ZoneError::Unchanged(_))
    }
}

impl From<zonefile::Error> for ZoneError {
    fn from(err: zonefile::Error) -> Self {
        ZoneError::Scan(err)
    }
}

impl From<io::Error> for ZoneError {
    fn from(err: io::Error) -> Self {
        ZoneError::Io(err)
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::Scan(err) => write!(f, "{err}"),
            ZoneError::Io(err) => write!(f, "Io error: {err}"),
            ZoneError::Unsupported { owner, rtype } => {
                write!(f, "{rtype} records are not supported, dropping {owner}")
            }
            ZoneError::OutOfZone { owner } => {
                write!(f, "Out of zone: {owner}")
            }
            ZoneError::MissingSoa { origin } => {
                write!(f, "No SOA record for origin {origin}")
            }
            ZoneError::Unchanged(serial) => {
                write!(f, "No change in SOA serial {serial}")
            }
        }
    }
}

impl std::error::Error for ZoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZoneError::Scan(err) => Some(err),
            ZoneError::Io(err) => Some(err),
            _ => None,
        }
    }
}
