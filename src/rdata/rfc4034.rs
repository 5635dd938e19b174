//! Record data from [RFC 4034]: RRSIG and NSEC records.
//!
//! This RFC defines the record types for DNSSEC. Only the two types the
//! zone engine uses for answering queries are interpreted here. DNSKEY and
//! DS records are kept as unknown record data.
//!
//! [RFC 4034]: https://tools.ietf.org/html/rfc4034

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Ttl;
use crate::base::scan::{Scan, ScanError, Scanner};
use crate::base::serial::Serial;
use crate::rdata::RecordData;
use core::fmt;

//------------ Rrsig ---------------------------------------------------------

/// RRSIG record data.
///
/// The signature itself is kept in its Base 64 presentation format since
/// the zone engine never verifies or composes it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rrsig {
    type_covered: Rtype,
    algorithm: u8,
    labels: u8,
    original_ttl: Ttl,
    expiration: Serial,
    inception: Serial,
    key_tag: u16,
    signer_name: Name,
    signature: String,
}

impl Rrsig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        type_covered: Rtype,
        algorithm: u8,
        labels: u8,
        original_ttl: Ttl,
        expiration: Serial,
        inception: Serial,
        key_tag: u16,
        signer_name: Name,
        signature: String,
    ) -> Self {
        Rrsig {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            signature,
        }
    }

    pub fn type_covered(&self) -> Rtype {
        self.type_covered
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn labels(&self) -> u8 {
        self.labels
    }

    pub fn original_ttl(&self) -> Ttl {
        self.original_ttl
    }

    pub fn expiration(&self) -> Serial {
        self.expiration
    }

    pub fn inception(&self) -> Serial {
        self.inception
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn signer_name(&self) -> &Name {
        &self.signer_name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        let type_covered = Rtype::scan(scanner)?;
        let algorithm = u8::scan(scanner)?;
        let labels = u8::scan(scanner)?;
        let original_ttl = Ttl::scan(scanner)?;
        let expiration = Serial::scan_rrsig(scanner)?;
        let inception = Serial::scan_rrsig(scanner)?;
        let key_tag = u16::scan(scanner)?;
        let signer_name = scanner.scan_name()?;
        let mut signature = String::new();
        for token in scanner.scan_remaining()? {
            signature.push_str(token.as_str());
        }
        if signature.is_empty() {
            return Err(ScanError::end_of_entry());
        }
        Ok(Self::new(
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            signature,
        ))
    }
}

//--- RecordData

impl RecordData for Rrsig {
    fn rtype(&self) -> Rtype {
        Rtype::RRSIG
    }

    fn to_lowercase(&self) -> Self {
        Rrsig {
            signer_name: self.signer_name.to_lowercase(),
            ..self.clone()
        }
    }
}

//--- Display

impl fmt::Display for Rrsig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.type_covered,
            self.algorithm,
            self.labels,
            self.original_ttl.as_secs(),
            self.expiration.display_rrsig(),
            self.inception.display_rrsig(),
            self.key_tag,
            self.signer_name,
            self.signature
        )
    }
}

//------------ Nsec ----------------------------------------------------------

/// NSEC record data.
///
/// An NSEC record names the next owner name in canonical order that has
/// records and lists the record types present at its own owner.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Nsec {
    next_name: Name,
    types: RtypeBitmap,
}

impl Nsec {
    pub fn new(next_name: Name, types: RtypeBitmap) -> Self {
        Nsec { next_name, types }
    }

    pub fn next_name(&self) -> &Name {
        &self.next_name
    }

    pub fn types(&self) -> &RtypeBitmap {
        &self.types
    }

    pub fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        let next_name = scanner.scan_name()?;
        let mut types = Vec::new();
        while scanner.continues() {
            types.push(Rtype::scan(scanner)?);
        }
        Ok(Self::new(next_name, RtypeBitmap::from_iter(types)))
    }
}

//--- RecordData

impl RecordData for Nsec {
    fn rtype(&self) -> Rtype {
        Rtype::NSEC
    }
}

//--- Display

impl fmt::Display for Nsec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.next_name)?;
        for rtype in self.types.iter() {
            write!(f, " {}", rtype)?;
        }
        Ok(())
    }
}

//------------ RtypeBitmap ---------------------------------------------------

/// The set of record types present at an NSEC owner.
///
/// The types are kept sorted and free of duplicates.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RtypeBitmap(Vec<Rtype>);

impl RtypeBitmap {
    pub fn contains(&self, rtype: Rtype) -> bool {
        self.0.binary_search(&rtype).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rtype> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Rtype> for RtypeBitmap {
    fn from_iter<I: IntoIterator<Item = Rtype>>(iter: I) -> Self {
        let mut types: Vec<_> = iter.into_iter().collect();
        types.sort();
        types.dedup();
        RtypeBitmap(types)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::test_scan;

    #[test]
    fn rrsig_scan() {
        let rdata = Rrsig::new(
            Rtype::A,
            8,
            3,
            Ttl::from_secs(3600),
            Serial::rrsig_from_str("20240201000000").unwrap(),
            Serial::rrsig_from_str("20240101000000").unwrap(),
            12345,
            "example.com.".parse().unwrap(),
            "AwEAAb+Zz==".into(),
        );
        test_scan(
            &[
                "A",
                "8",
                "3",
                "3600",
                "20240201000000",
                "20240101000000",
                "12345",
                "example.com.",
                "AwEAAb+",
                "Zz==",
            ],
            Rrsig::scan,
            &rdata,
        );
        assert_eq!(
            rdata.to_string(),
            "A 8 3 3600 20240201000000 20240101000000 12345 \
             example.com. AwEAAb+Zz=="
        );
    }

    #[test]
    fn nsec_scan() {
        let rdata = Nsec::new(
            "b.example.com.".parse().unwrap(),
            [Rtype::RRSIG, Rtype::A, Rtype::NSEC, Rtype::A]
                .into_iter()
                .collect(),
        );
        test_scan(&["b", "A", "RRSIG", "NSEC"], Nsec::scan, &rdata);
        assert!(rdata.types().contains(Rtype::NSEC));
        assert!(!rdata.types().contains(Rtype::MX));
        assert_eq!(rdata.to_string(), "b.example.com. A RRSIG NSEC");
    }
}
