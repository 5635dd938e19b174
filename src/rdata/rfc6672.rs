//! Record data from [RFC 6672]: DNAME.
//!
//! [RFC 6672]: https://tools.ietf.org/html/rfc6672

use crate::base::iana::Rtype;
use crate::base::name::{Name, NameError};
use crate::base::scan::{ScanError, Scanner};
use crate::rdata::RecordData;

//------------ Dname --------------------------------------------------------

name_type! {
    /// DNAME record data.
    ///
    /// The DNAME record provides redirection for a subtree of the domain
    /// name tree in the DNS.
    ///
    /// The DNAME type is defined in RFC 6672.
    (Dname, DNAME, dname, into_dname)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::test_scan;

    #[test]
    fn dname_scan() {
        let rdata: Dname = "other.example.net.".parse().unwrap();
        test_scan(&["other.example.net."], Dname::scan, &rdata);
        assert_eq!(rdata.rtype(), Rtype::DNAME);
    }
}
