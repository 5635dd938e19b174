//! Resource Records.
//!
//! This module defines types related to DNS resource records. The most
//! complete one is [`Record`] which contains a complete record for the
//! record data carried by zones, [`ZoneRecordData`]. The time to live of a
//! record is kept as a [`Ttl`].

use super::iana::{Class, Rtype};
use super::name::Name;
use super::scan::{Scan, ScanError, Scanner};
use crate::rdata::{RecordData, ZoneRecordData};
use core::{fmt, ops, str};
use std::time::Duration;

//------------ Record --------------------------------------------------------

/// A DNS resource record.
///
/// All information available through the DNS is stored in resource records.
/// They have a three part key of a domain name, resource record type, and
/// class. Data is arranged in a tree which is navigated using the domain
/// name. Each node in the tree carries a label, starting with the root
/// label as the top-most node. The tree is traversed by stepping through the
/// name from right to left, finding a child node carring the label of each
/// step. The domain name resulting from this traversal is part of the
/// record itself. It is called the *owner* of the record.
///
/// The record type describes the kind of data the record holds, such as IP
/// addresses. The class, finally, describes which sort of network the
/// information is for. The DNS was originally intended to be used for
/// networks other than the Internet as well, but this has never happened,
/// so in practice the class is `IN`.
///
/// In addition to the key, each record carries a *time to live* which
/// states how long a cache may keep the record around.
///
/// Records compare equal if all their parts do, with owner names compared
/// ignoring ASCII case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    owner: Name,
    class: Class,
    ttl: Ttl,
    data: ZoneRecordData,
}

impl Record {
    /// Creates a new record from its parts.
    pub fn new(
        owner: Name,
        class: Class,
        ttl: Ttl,
        data: impl Into<ZoneRecordData>,
    ) -> Self {
        Record {
            owner,
            class,
            ttl,
            data: data.into(),
        }
    }

    /// Returns a reference to the owner domain name.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the record’s time-to-live.
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    /// Returns a reference to the record data.
    pub fn data(&self) -> &ZoneRecordData {
        &self.data
    }

    /// Trades the record for its record data.
    pub fn into_data(self) -> ZoneRecordData {
        self.data
    }

    /// Returns a copy of the record with a different owner.
    ///
    /// This is used to expand wildcard records to the queried name.
    #[must_use]
    pub fn with_owner(&self, owner: Name) -> Self {
        Record {
            owner,
            class: self.class,
            ttl: self.ttl,
            data: self.data.clone(),
        }
    }

    /// Returns a copy with owner and embedded names lowercased.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        Record {
            owner: self.owner.to_lowercase(),
            class: self.class,
            ttl: self.ttl,
            data: self.data.to_lowercase(),
        }
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner,
            self.ttl.as_secs(),
            self.class,
            self.rtype(),
            self.data
        )
    }
}

//------------ Ttl ----------------------------------------------

const SECS_PER_MINUTE: u32 = 60;
const SECS_PER_HOUR: u32 = 3600;
const SECS_PER_DAY: u32 = 86400;
const SECS_PER_WEEK: u32 = 604800;

/// A span of time, typically used to describe the time a given DNS record is valid.
///
/// `Ttl` has second-level precision as required by [RFC 2181] and provides
/// [`Ttl::into_duration`] to convert it for use with timers. It implements
/// `Default` by returning a zero-length `Ttl`.
///
/// In zone files, a TTL can be given either as a plain number of seconds
/// or with the unit suffixes `s`, `m`, `h`, `d`, and `w`, as in `1h30m`.
///
/// [RFC 2181]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ttl(u32);

impl Ttl {
    /// A time-to-live of one second.
    pub const SECOND: Ttl = Ttl::from_secs(1);

    /// A time-to-live of one minute.
    pub const MINUTE: Ttl = Ttl::from_mins(1);

    /// A time-to-live of one hour.
    pub const HOUR: Ttl = Ttl::from_hours(1);

    /// A time-to-live of one day.
    pub const DAY: Ttl = Ttl::from_days(1);

    /// A duration of zero time.
    pub const ZERO: Ttl = Ttl::from_secs(0);

    /// The maximum theoretical time to live.
    pub const MAX: Ttl = Ttl::from_secs(u32::MAX);

    /// Returns the total time to live in seconds.
    #[must_use]
    #[inline]
    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    /// Converts a `Ttl` into a [`std::time::Duration`].
    #[must_use]
    #[inline]
    pub const fn into_duration(&self) -> Duration {
        Duration::from_secs(self.0 as u64)
    }

    /// Creates a new `Ttl` from the specified number of seconds.
    #[must_use]
    #[inline]
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Creates a new `Ttl` from the specified number of minutes.
    ///
    /// # Panics
    ///
    /// The maximum number of minutes that a `Ttl` can represent is
    /// `71582788`. This method will panic if it is being called with a value
    /// greater than that.
    #[must_use]
    #[inline]
    pub const fn from_mins(minutes: u32) -> Self {
        assert!(minutes <= 71582788);
        Self(minutes * SECS_PER_MINUTE)
    }

    /// Creates a new `Ttl` from the specified number of hours.
    ///
    /// # Panics
    ///
    /// The maximum number of hours that a `Ttl` can represent is `1193046`.
    /// This method will panic if it is being called with a value greater than that.
    #[must_use]
    #[inline]
    pub const fn from_hours(hours: u32) -> Self {
        assert!(hours <= 1193046);
        Self(hours * SECS_PER_HOUR)
    }

    /// Creates a new `Ttl` from the specified number of days.
    ///
    /// # Panics
    ///
    /// The maximum number of days that a `Ttl` can represent is `49710`.
    /// This method will panic if it is being called with a value greater than that.
    #[must_use]
    #[inline]
    pub const fn from_days(days: u16) -> Self {
        assert!(days <= 49710);
        Self(days as u32 * SECS_PER_DAY)
    }

    /// Creates a new `Ttl` from a [`std::time::Duration`].
    ///
    /// Sub-second precision is lost and values beyond the range of a `u32`
    /// are truncated.
    #[must_use]
    #[inline]
    pub const fn from_duration_lossy(duration: Duration) -> Self {
        Self(duration.as_secs() as u32)
    }

    /// Returns true if this `Tll` spans no time.
    #[must_use]
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

//--- Arithmetic

impl ops::Add for Ttl {
    type Output = Ttl;

    fn add(self, rhs: Self) -> Self::Output {
        Ttl(self.0.saturating_add(rhs.0))
    }
}

impl ops::Sub for Ttl {
    type Output = Ttl;

    fn sub(self, rhs: Self) -> Self::Output {
        Ttl(self.0.saturating_sub(rhs.0))
    }
}

//--- From and FromStr

impl From<Ttl> for Duration {
    fn from(value: Ttl) -> Self {
        value.into_duration()
    }
}

impl str::FromStr for Ttl {
    type Err = TtlError;

    /// Parses a TTL with optional unit suffixes.
    ///
    /// A plain number is a number of seconds. Otherwise every number must
    /// be followed by one of the units `s`, `m`, `h`, `d`, or `w`, ignoring
    /// case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TtlError(()));
        }
        if s.bytes().all(|ch| ch.is_ascii_digit()) {
            return s.parse().map(Ttl).map_err(|_| TtlError(()));
        }
        let mut total = 0u32;
        let mut current: Option<u32> = None;
        for ch in s.chars() {
            if let Some(digit) = ch.to_digit(10) {
                let value = current.unwrap_or(0);
                current = Some(
                    value
                        .checked_mul(10)
                        .and_then(|value| value.checked_add(digit))
                        .ok_or(TtlError(()))?,
                );
                continue;
            }
            let unit = match ch.to_ascii_lowercase() {
                's' => 1,
                'm' => SECS_PER_MINUTE,
                'h' => SECS_PER_HOUR,
                'd' => SECS_PER_DAY,
                'w' => SECS_PER_WEEK,
                _ => return Err(TtlError(())),
            };
            let value = current.take().ok_or(TtlError(()))?;
            total = value
                .checked_mul(unit)
                .and_then(|value| total.checked_add(value))
                .ok_or(TtlError(()))?;
        }
        if current.is_some() {
            // A trailing number without a unit.
            return Err(TtlError(()));
        }
        Ok(Ttl(total))
    }
}

//--- Scan

impl Scan for Ttl {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        scanner
            .expect_token()?
            .as_str()
            .parse()
            .map_err(ScanError::custom)
    }
}

//--- Display

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//------------ TtlError ------------------------------------------------------

/// A string did not contain a valid time-to-live.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TtlError(());

impl fmt::Display for TtlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid TTL")
    }
}

impl std::error::Error for TtlError {}

//============ Testing =======================================================
