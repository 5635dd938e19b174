//! The records of a single owner name.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Record;
use std::collections::BTreeMap;

//------------ Elem ----------------------------------------------------------

/// All records of a single owner name, grouped by record type.
///
/// Records of the same type are kept in the order they were inserted. The
/// owner of all records is the same name in lowercase.
#[derive(Clone, Debug)]
pub struct Elem {
    name: Name,
    rrs: BTreeMap<Rtype, Vec<Record>>,
}

impl Elem {
    /// Creates a new element holding the given record.
    pub fn new(record: Record) -> Self {
        let mut res = Elem {
            name: record.owner().clone(),
            rrs: BTreeMap::new(),
        };
        res.insert(record);
        res
    }

    /// Returns the owner name of the element.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record types present.
    pub fn types(&self) -> impl Iterator<Item = Rtype> + '_ {
        self.rrs.keys().copied()
    }

    /// Returns the records of the given type.
    ///
    /// The slice is empty if there are none.
    pub fn rrs(&self, rtype: Rtype) -> &[Record] {
        self.rrs.get(&rtype).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns whether there are records of the given type.
    pub fn contains(&self, rtype: Rtype) -> bool {
        self.rrs.contains_key(&rtype)
    }

    /// Returns an iterator over all records.
    pub fn all(&self) -> impl Iterator<Item = &Record> + '_ {
        self.rrs.values().flatten()
    }

    /// Returns the number of records held.
    pub fn len(&self) -> usize {
        self.rrs.values().map(Vec::len).sum()
    }

    /// Returns whether the element holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.rrs.is_empty()
    }

    /// Adds a record.
    ///
    /// A record with the same data as an existing one of the same type is
    /// ignored.
    pub fn insert(&mut self, record: Record) {
        let rrs = self.rrs.entry(record.rtype()).or_default();
        if !rrs.iter().any(|item| item.data() == record.data()) {
            rrs.push(record)
        }
    }

    /// Removes all records of the given type.
    pub fn delete(&mut self, rtype: Rtype) {
        self.rrs.remove(&rtype);
    }

    /// Returns the records of a type rewritten to a wildcard's target.
    ///
    /// The returned records are copies with the owner replaced by `qname`.
    pub fn rrs_for_wildcard(&self, rtype: Rtype, qname: &Name) -> Vec<Record> {
        self.rrs(rtype)
            .iter()
            .map(|record| record.with_owner(qname.clone()))
            .collect()
    }

    /// Returns the RRSIG records covering the given type.
    pub fn signatures_for(
        &self,
        rtype: Rtype,
    ) -> impl Iterator<Item = &Record> + '_ {
        self.rrs(Rtype::RRSIG).iter().filter(move |record| {
            record
                .data()
                .as_rrsig()
                .map_or(false, |sig| sig.type_covered() == rtype)
        })
    }

    /// Returns the records of a type followed by their signatures.
    ///
    /// Signatures are only included if `dnssec` is true.
    pub fn rrs_with_sigs(&self, rtype: Rtype, dnssec: bool) -> Vec<Record> {
        let mut res = self.rrs(rtype).to_vec();
        if dnssec {
            res.extend(self.signatures_for(rtype).cloned());
        }
        res
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::Class;
    use crate::base::record::Ttl;
    use crate::base::serial::Serial;
    use crate::rdata::{Rrsig, Txt, ZoneRecordData, A};

    fn record(owner: &str, data: impl Into<ZoneRecordData>) -> Record {
        Record::new(owner.parse().unwrap(), Class::IN, Ttl::HOUR, data)
    }

    fn rrsig(covered: Rtype) -> Rrsig {
        Rrsig::new(
            covered,
            13,
            2,
            Ttl::HOUR,
            Serial(1_700_000_000),
            Serial(1_690_000_000),
            12345,
            "example.org.".parse().unwrap(),
            "c2lnbmF0dXJl".into(),
        )
    }

    #[test]
    fn insert_and_delete() {
        let mut elem =
            Elem::new(record("a.example.org.", A::from_octets(192, 0, 2, 1)));
        elem.insert(record("a.example.org.", A::from_octets(192, 0, 2, 2)));
        elem.insert(record("a.example.org.", A::from_octets(192, 0, 2, 1)));
        elem.insert(record("a.example.org.", Txt::build_from_slice(b"x")));
        assert_eq!(elem.len(), 3);
        assert_eq!(elem.rrs(Rtype::A).len(), 2);
        assert_eq!(
            elem.rrs(Rtype::A)[1].data(),
            &ZoneRecordData::A(A::from_octets(192, 0, 2, 2))
        );
        assert_eq!(elem.types().collect::<Vec<_>>(), [Rtype::A, Rtype::TXT]);
        assert!(elem.rrs(Rtype::MX).is_empty());

        elem.delete(Rtype::A);
        assert!(!elem.contains(Rtype::A));
        assert!(!elem.is_empty());
        elem.delete(Rtype::TXT);
        assert!(elem.is_empty());
    }

    #[test]
    fn wildcard_and_signatures() {
        let mut elem =
            Elem::new(record("*.w.example.org.", Txt::build_from_slice(b"w")));
        elem.insert(record("*.w.example.org.", rrsig(Rtype::TXT)));
        elem.insert(record("*.w.example.org.", rrsig(Rtype::NSEC)));

        let qname: Name = "a.w.example.org.".parse().unwrap();
        let rrs = elem.rrs_for_wildcard(Rtype::TXT, &qname);
        assert_eq!(rrs.len(), 1);
        assert_eq!(rrs[0].owner(), &qname);
        assert_eq!(elem.rrs(Rtype::TXT)[0].owner().to_string(), "*.w.example.org.");

        assert_eq!(elem.signatures_for(Rtype::TXT).count(), 1);
        assert_eq!(elem.rrs_with_sigs(Rtype::TXT, false).len(), 1);
        assert_eq!(elem.rrs_with_sigs(Rtype::TXT, true).len(), 2);
        assert_eq!(elem.rrs_with_sigs(Rtype::A, true).len(), 0);
    }
}
