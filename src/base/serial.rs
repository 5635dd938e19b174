//! Zone serial numbers.
//!
//! The serial of a zone’s SOA record wraps around at 2^32. Deciding whether
//! a primary has a newer version of a zone therefore uses the sequence
//! space arithmetic of [RFC 1982] rather than plain integer comparison.
//!
//! [RFC 1982]: https://tools.ietf.org/html/rfc1982

use super::scan::{Scan, ScanError, Scanner};
use core::cmp::Ordering;
use core::str::FromStr;
use core::{cmp, fmt, str};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

//------------ Serial --------------------------------------------------------

/// A serial number.
///
/// Serials are only partially ordered: two values exactly 2^31 apart are
/// neither smaller nor larger than each other. The type therefore
/// implements `PartialOrd` but not `Ord`.
///
/// Serials are also used for the inception and expiration times of RRSIG
/// records which are Unix timestamps modulo 2^32.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Serial(pub u32);

impl Serial {
    /// Returns the serial number as a raw integer.
    #[must_use]
    pub fn into_int(self) -> u32 {
        self.0
    }

    /// Returns whether `other` is a newer serial than `self`.
    ///
    /// This is the case if `other - self` modulo 2^32 lies between 1 and
    /// 2^31 - 1. Serials exactly 2^31 apart are not ordered and neither is
    /// newer than the other.
    #[must_use]
    pub fn precedes(self, other: Serial) -> bool {
        self.partial_cmp(&other) == Some(Ordering::Less)
    }

    /// Scan a serial represention signature time value.
    ///
    /// In [RRSIG] records, the expiration and inception times are given as
    /// serial values. Their representation format can either be the
    /// value or a specific date in `YYYYMMDDHHmmSS` format.
    ///
    /// [RRSIG]: crate::rdata::Rrsig
    pub fn scan_rrsig<S: Scanner + ?Sized>(
        scanner: &mut S,
    ) -> Result<Self, ScanError> {
        let token = scanner.expect_token()?;
        Self::rrsig_from_str(token.as_str()).map_err(ScanError::custom)
    }

    /// Parses a serial representing a time value from a string.
    ///
    /// In [RRSIG] records, the expiration and inception times are given as
    /// serial values. Their representation format can either be the
    /// value or a specific date in `YYYYMMDDHHmmSS` format.
    ///
    /// [RRSIG]: crate::rdata::Rrsig
    pub fn rrsig_from_str(src: &str) -> Result<Self, IllegalSignatureTime> {
        if !src.is_ascii() {
            return Err(IllegalSignatureTime);
        }
        if src.len() == 14 {
            let year = u32::from_str(&src[0..4])
                .map_err(|_| IllegalSignatureTime)?
                as i32;
            let month = Month::try_from(
                u8::from_str(&src[4..6]).map_err(|_| IllegalSignatureTime)?,
            )
            .map_err(|_| IllegalSignatureTime)?;
            let day =
                u8::from_str(&src[6..8]).map_err(|_| IllegalSignatureTime)?;
            let hour = u8::from_str(&src[8..10])
                .map_err(|_| IllegalSignatureTime)?;
            let minute = u8::from_str(&src[10..12])
                .map_err(|_| IllegalSignatureTime)?;
            let second = u8::from_str(&src[12..14])
                .map_err(|_| IllegalSignatureTime)?;
            Ok(Serial(
                PrimitiveDateTime::new(
                    Date::from_calendar_date(year, month, day)
                        .map_err(|_| IllegalSignatureTime)?,
                    Time::from_hms(hour, minute, second)
                        .map_err(|_| IllegalSignatureTime)?,
                )
                .assume_utc()
                .unix_timestamp() as u32,
            ))
        } else {
            Serial::from_str(src).map_err(|_| IllegalSignatureTime)
        }
    }

    /// Returns a value that displays as a signature time.
    ///
    /// The value is shown in `YYYYMMDDHHmmSS` format, taking the serial as
    /// a Unix timestamp.
    #[must_use]
    pub fn display_rrsig(self) -> impl fmt::Display {
        RrsigTime(self)
    }
}

//--- Scan

impl Scan for Serial {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        u32::scan(scanner).map(Into::into)
    }
}

//--- From and FromStr

impl From<u32> for Serial {
    fn from(value: u32) -> Serial {
        Serial(value)
    }
}

impl From<Serial> for u32 {
    fn from(serial: Serial) -> u32 {
        serial.0
    }
}

impl str::FromStr for Serial {
    type Err = <u32 as str::FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <u32 as str::FromStr>::from_str(s).map(Into::into)
    }
}

//--- Display

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--- PartialOrd

impl cmp::PartialOrd for Serial {
    fn partial_cmp(&self, other: &Serial) -> Option<cmp::Ordering> {
        // The distance going forward from `self` to `other`.
        match other.0.wrapping_sub(self.0) {
            0 => Some(Ordering::Equal),
            1..=0x7FFF_FFFF => Some(Ordering::Less),
            0x8000_0000 => None,
            _ => Some(Ordering::Greater),
        }
    }
}

//------------ RrsigTime -----------------------------------------------------

struct RrsigTime(Serial);

impl fmt::Display for RrsigTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match OffsetDateTime::from_unix_timestamp(i64::from(self.0 .0)) {
            Ok(time) => write!(
                f,
                "{:04}{:02}{:02}{:02}{:02}{:02}",
                time.year(),
                u8::from(time.month()),
                time.day(),
                time.hour(),
                time.minute(),
                time.second(),
            ),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

//============ Error Types ===================================================

#[derive(Clone, Copy, Debug)]
pub struct IllegalSignatureTime;

impl fmt::Display for IllegalSignatureTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("illegal signature time")
    }
}

impl std::error::Error for IllegalSignatureTime {}

//============ Testing =======================================================
