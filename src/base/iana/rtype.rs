//! Resource Record (RR) TYPEs

use crate::base::scan::{Scan, ScanError, Scanner};

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource Record Types.
    ///
    /// Each resource records has a 16 bit type value indicating what kind of
    /// information is represented by the record. A few aditional types,
    /// called query types, are defined as well and can only be used in
    /// questions. This type represents both these types.
    ///
    /// The currently assigned values are maintained in an [IANA registry].
    /// Only the types that commonly show up in zone files have a mnemonic
    /// here; all others are still representable and are written as
    /// `TYPEnnn`.
    ///
    /// [IANA registry]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
    =>
    Rtype, u16;

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (NS => 2, "NS")

    /// The canonical name for an alias
    (CNAME => 5, "CNAME")

    /// Marks the start of a zone of authority.
    (SOA => 6, "SOA")

    /// A domain name pointer.
    (PTR => 12, "PTR")

    /// Host information.
    (HINFO => 13, "HINFO")

    /// Mail exchange.
    (MX => 15, "MX")

    /// Text strings.
    (TXT => 16, "TXT")

    /// For Responsible Person.
    (RP => 17, "RP")

    /// IPv6 address.
    (AAAA => 28, "AAAA")

    /// Location information.
    (LOC => 29, "LOC")

    /// Server selection.
    (SRV => 33, "SRV")

    /// Naming authority pointer.
    (NAPTR => 35, "NAPTR")

    /// Certificate.
    (CERT => 37, "CERT")

    /// Delegation name.
    ///
    /// See RFC 6672.
    (DNAME => 39, "DNAME")

    /// OPT.
    (OPT => 41, "OPT")

    /// Delegation signer.
    (DS => 43, "DS")

    /// SSH key fingerprint.
    (SSHFP => 44, "SSHFP")

    /// RRSIG.
    (RRSIG => 46, "RRSIG")

    /// NSEC.
    (NSEC => 47, "NSEC")

    /// DNSKEY.
    (DNSKEY => 48, "DNSKEY")

    /// NSEC3.
    ///
    /// Hashed denial of existence is not supported by the zone engine; the
    /// type exists so that it can be recognised and rejected.
    (NSEC3 => 50, "NSEC3")

    /// NSEC3PARAM.
    (NSEC3PARAM => 51, "NSEC3PARAM")

    /// TLSA.
    (TLSA => 52, "TLSA")

    /// Child DS.
    (CDS => 59, "CDS")

    /// DNSKEY(s) the child wants reflected in DS.
    (CDNSKEY => 60, "CDNSKEY")

    /// Service binding.
    (SVCB => 64, "SVCB")

    /// HTTPS binding.
    (HTTPS => 65, "HTTPS")

    /// Incremental transfer.
    (IXFR => 251, "IXFR")

    /// Transfer of entire zone.
    (AXFR => 252, "AXFR")

    /// A request for all records the server/cache has available.
    (ANY => 255, "ANY")

    /// URI.
    (URI => 256, "URI")

    /// Certification Authority Restriction.
    (CAA => 257, "CAA")
}

int_enum_str_with_prefix!(Rtype, "TYPE", u16, "unknown record type");

impl Rtype {
    /// Returns whether the type is a pseudo type only used in questions.
    #[must_use]
    pub fn is_pseudo(self) -> bool {
        matches!(self, Rtype::OPT | Rtype::IXFR | Rtype::AXFR | Rtype::ANY)
    }
}

impl Scan for Rtype {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        scanner
            .expect_token()?
            .as_str()
            .parse()
            .map_err(ScanError::custom)
    }
}

//============ Tests =========================================================
