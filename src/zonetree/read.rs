//! Answering queries from a zone.
//!
//! The lookup first walks down from the origin towards the query name one
//! label at a time. This finds DNAME records and delegations above the
//! name and remembers wildcards that might apply. Only then is the name
//! itself considered, followed by a wildcard match, and finally the
//! denial of existence.

use tracing::{debug, warn};

use super::answer::{Answer, LookupResult};
use super::elem::Elem;
use super::zone::{Zone, ZoneContent};
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::rdata::{Cname, ZoneRecordData};

/// The maximum number of CNAMEs followed after the first one.
pub const MAX_CNAME_CHAIN: usize = 8;

//------------ Query ---------------------------------------------------------

/// A question to the zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    qname: Name,
    qtype: Rtype,
    dnssec_ok: bool,
}

impl Query {
    /// Creates a query for `qname` and `qtype` without DNSSEC records.
    pub fn new(qname: Name, qtype: Rtype) -> Self {
        Query {
            qname,
            qtype,
            dnssec_ok: false,
        }
    }

    /// Sets whether DNSSEC records should be included.
    pub fn with_dnssec(mut self, dnssec_ok: bool) -> Self {
        self.dnssec_ok = dnssec_ok;
        self
    }

    /// Returns the name asked for.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the record type asked for.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns whether DNSSEC records should be included.
    pub fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }
}

//------------ Zone::lookup --------------------------------------------------

impl Zone {
    /// Answers a query.
    ///
    /// The lookup works on a snapshot of the zone’s content. If a CNAME
    /// chain leads out of the zone, the rest of the chain is resolved via
    /// the upstream resolver after the snapshot has been released.
    ///
    /// The zone’s expired flag is not considered. This is left to the
    /// caller.
    pub async fn lookup(&self, query: &Query) -> Answer {
        let step = {
            let content = self.snapshot();
            Lookup::new(&content, &self.origin, query).resolve()
        };
        let (mut answer, target) = match step {
            Step::Done(answer) => return answer,
            Step::Upstream { answer, target } => (answer, target),
        };
        let upstream = match self.upstream.as_ref() {
            Some(upstream) => upstream,
            None => return answer,
        };
        debug!(
            "Zone '{}': resolving CNAME target {target} upstream",
            self.origin
        );
        match upstream.lookup(target.clone(), query.qtype()).await {
            Ok(reply) => {
                let result = LookupResult::from_upstream(
                    reply.rcode(),
                    reply.answer().is_empty(),
                );
                answer.extend_answer(reply.into_answer());
                answer.set_result(result);
            }
            Err(err) => {
                warn!(
                    "Zone '{}': upstream lookup of {target} failed: {err}",
                    self.origin
                );
                answer.set_result(LookupResult::ServerFailure);
            }
        }
        answer
    }
}

//------------ Step ----------------------------------------------------------

/// The outcome of the synchronous part of a lookup.
enum Step {
    /// The answer is complete.
    Done(Answer),

    /// A CNAME chain leaves the zone and `target` needs resolving upstream.
    Upstream { answer: Answer, target: Name },
}

//------------ Lookup --------------------------------------------------------

/// A single lookup against a snapshot of a zone.
struct Lookup<'a> {
    content: &'a ZoneContent,
    origin: &'a Name,
    qname: &'a Name,
    qtype: Rtype,
    dnssec: bool,
}

impl<'a> Lookup<'a> {
    fn new(content: &'a ZoneContent, origin: &'a Name, query: &'a Query) -> Self {
        Lookup {
            content,
            origin,
            qname: query.qname(),
            qtype: query.qtype(),
            dnssec: query.dnssec_ok(),
        }
    }

    fn resolve(&self) -> Step {
        let apex = self.content.apex();
        let tree = self.content.tree();

        // A secondary zone that hasn’t been transferred yet has no SOA.
        if apex.soa().is_none() || !self.qname.ends_with(self.origin) {
            return Step::Done(Answer::server_failure());
        }
        if self.qtype == Rtype::SOA {
            return Step::Done(
                Answer::new(LookupResult::Success)
                    .with_answer(apex.soa_with_sigs(self.dnssec))
                    .with_authority(apex.ns_with_sigs(self.dnssec)),
            );
        }
        if self.qtype == Rtype::NS && self.qname == self.origin {
            return Step::Done(
                Answer::new(LookupResult::Success)
                    .with_answer(apex.ns_with_sigs(self.dnssec))
                    .with_additional(tree.glue(apex.ns(), self.dnssec)),
            );
        }

        let origin_labels = self.origin.label_count();
        let qname_labels = self.qname.label_count();
        let mut wildcard = None;
        let mut found = None;

        for count in origin_labels..=qname_labels {
            let name = self.qname.suffix(count);
            let elem = match tree.search(&name) {
                Some(elem) => elem,
                None => {
                    if name != *self.origin {
                        wildcard = self.probe_wildcard(&name, wildcard);
                    }
                    continue;
                }
            };

            if let Some(step) = self.dname(elem) {
                return step;
            }

            if elem.contains(Rtype::NS) && elem.name() != self.origin {
                // A DS query for the delegation point itself is answered
                // from the parent side.
                if !(self.qtype == Rtype::DS && elem.name() == self.qname) {
                    return Step::Done(self.delegation(elem));
                }
            }

            if count == qname_labels {
                found = Some(elem);
            }
        }

        if let Some(elem) = found {
            return self.answer_from(elem, None);
        }
        if let Some(elem) = wildcard {
            return self.answer_from(elem, Some(self.qname));
        }
        if self.qname == self.origin {
            return Step::Done(
                Answer::new(LookupResult::NoData)
                    .with_authority(apex.soa_with_sigs(self.dnssec)),
            );
        }
        Step::Done(self.denial())
    }

    /// Checks for a wildcard that may apply to a missing name.
    ///
    /// Returns the wildcard to remember for the rest of the walk. A hit
    /// replaces the current one, otherwise the current one is kept.
    fn probe_wildcard(
        &self,
        name: &Name,
        current: Option<&'a Elem>,
    ) -> Option<&'a Elem> {
        let wild = name.parent().and_then(|parent| parent.wildcard().ok());
        match wild.and_then(|wild| self.content.tree().search(&wild)) {
            Some(elem) => Some(elem),
            None => current,
        }
    }

    /// Synthesizes a CNAME if `elem` has a DNAME applying to the query.
    fn dname(&self, elem: &Elem) -> Option<Step> {
        let dname_rr = elem.rrs(Rtype::DNAME).first()?;
        let dname = match dname_rr.data() {
            ZoneRecordData::Dname(dname) => dname,
            _ => return None,
        };
        if !self.qname.is_below(elem.name()) {
            return None;
        }
        let target =
            match self.qname.replace_suffix(elem.name(), dname.dname()) {
                Ok(target) => target,
                Err(_) => return None,
            };
        let cname = Record::new(
            self.qname.clone(),
            dname_rr.class(),
            dname_rr.ttl(),
            Cname::new(target.clone()),
        );
        let mut chain = elem.rrs_with_sigs(Rtype::DNAME, self.dnssec);
        chain.push(cname);
        if self.qtype == Rtype::CNAME {
            return Some(Step::Done(self.success(chain)));
        }
        Some(self.chase(chain, target))
    }

    /// Creates the referral for a delegation.
    fn delegation(&self, elem: &Elem) -> Answer {
        let ns = elem.rrs(Rtype::NS);
        let glue = self.content.tree().glue(ns, self.dnssec);
        let mut authority = ns.to_vec();
        if self.dnssec {
            authority.extend(elem.rrs_with_sigs(Rtype::DS, true));
        }
        Answer::new(LookupResult::Delegation)
            .with_authority(authority)
            .with_additional(glue)
    }

    /// Answers from an element found for the query name.
    ///
    /// If `wildcard` is given, the element is a wildcard and records are
    /// expanded to this name.
    fn answer_from(&self, elem: &Elem, wildcard: Option<&Name>) -> Step {
        let apex = self.content.apex();
        let rrs = |rtype| match wildcard {
            Some(qname) => elem.rrs_for_wildcard(rtype, qname),
            None => elem.rrs(rtype).to_vec(),
        };
        let sigs = |rtype| -> Vec<Record> {
            if !self.dnssec {
                return Vec::new();
            }
            let sigs = elem.signatures_for(rtype);
            match wildcard {
                Some(qname) => {
                    sigs.map(|sig| sig.with_owner(qname.clone())).collect()
                }
                None => sigs.cloned().collect(),
            }
        };

        if self.qtype != Rtype::CNAME {
            let mut chain = rrs(Rtype::CNAME);
            if let Some(target) = chain.first().and_then(cname_target) {
                chain.extend(sigs(Rtype::CNAME));
                return self.chase(chain, target);
            }
        }

        let mut answer = rrs(self.qtype);
        if answer.is_empty() {
            let mut authority = apex.soa_with_sigs(self.dnssec);
            if self.dnssec {
                authority.extend(elem.rrs_with_sigs(Rtype::NSEC, true));
            }
            return Step::Done(
                Answer::new(LookupResult::NoData).with_authority(authority),
            );
        }

        let mut authority = apex.ns_with_sigs(self.dnssec);
        let additional = match wildcard {
            Some(qname) => {
                if self.dnssec {
                    // Prove that no closer name exists.
                    if let Some(deny) = self.content.tree().prev(qname) {
                        authority
                            .extend(deny.rrs_with_sigs(Rtype::NSEC, true));
                    }
                }
                Vec::new()
            }
            None => self.additional(&answer),
        };
        answer.extend(sigs(self.qtype));
        Step::Done(
            Answer::new(LookupResult::Success)
                .with_answer(answer)
                .with_authority(authority)
                .with_additional(additional),
        )
    }

    /// Follows a CNAME chain through the zone.
    ///
    /// `chain` contains the records so far and `target` is the target of
    /// the last CNAME.
    fn chase(&self, mut chain: Vec<Record>, mut target: Name) -> Step {
        let tree = self.content.tree();
        let mut elem = match tree.search(&target) {
            Some(elem) => elem,
            None => {
                return Step::Upstream {
                    answer: self.success(chain),
                    target,
                }
            }
        };
        let mut hops = 0;
        while let Some(next) = elem.rrs(Rtype::CNAME).first() {
            let next = match cname_target(next) {
                Some(next) => next,
                None => break,
            };
            if hops == MAX_CNAME_CHAIN {
                return Step::Done(self.success(chain));
            }
            hops += 1;
            chain.extend(elem.rrs_with_sigs(Rtype::CNAME, self.dnssec));
            target = next;
            elem = match tree.search(&target) {
                Some(elem) => elem,
                None => {
                    return Step::Upstream {
                        answer: self.success(chain),
                        target,
                    }
                }
            };
        }
        chain.extend(elem.rrs_with_sigs(self.qtype, self.dnssec));
        Step::Done(self.success(chain))
    }

    /// Creates the denial of existence for a name not in the zone.
    fn denial(&self) -> Answer {
        let tree = self.content.tree();

        // If a name below the query name exists, it is an empty
        // non-terminal.
        let result = match tree.next(self.qname) {
            Some(next) if next.name().is_below(self.qname) => {
                LookupResult::NoData
            }
            _ => LookupResult::NameError,
        };

        let mut authority = self.content.apex().soa_with_sigs(self.dnssec);
        if self.dnssec {
            if let Some(deny) = tree.prev(self.qname) {
                authority.extend(deny.rrs_with_sigs(Rtype::NSEC, true));
                if result == LookupResult::NameError {
                    let ce =
                        self.content.closest_encloser(self.origin, self.qname);
                    let wild = ce.wildcard().ok();
                    if let Some(ss) = wild.and_then(|wild| tree.prev(&wild)) {
                        if ss.name() != deny.name() {
                            authority
                                .extend(ss.rrs_with_sigs(Rtype::NSEC, true));
                        }
                    }
                }
            }
        }
        Answer::new(result).with_authority(authority)
    }

    /// Returns the addresses of in-zone MX and SRV targets.
    fn additional(&self, answer: &[Record]) -> Vec<Record> {
        let tree = self.content.tree();
        let mut res = Vec::new();
        for record in answer {
            let name = match record.data() {
                ZoneRecordData::Mx(mx) => mx.exchange(),
                ZoneRecordData::Srv(srv) => srv.target(),
                _ => continue,
            };
            if !name.ends_with(self.origin) {
                continue;
            }
            if let Some(elem) = tree.search(name) {
                res.extend(elem.rrs_with_sigs(Rtype::A, self.dnssec));
                res.extend(elem.rrs_with_sigs(Rtype::AAAA, self.dnssec));
            }
        }
        res
    }

    /// Creates a successful answer with the given answer section.
    fn success(&self, answer: Vec<Record>) -> Answer {
        Answer::new(LookupResult::Success)
            .with_answer(answer)
            .with_authority(self.content.apex().ns_with_sigs(self.dnssec))
    }
}

fn cname_target(record: &Record) -> Option<Name> {
    match record.data() {
        ZoneRecordData::Cname(cname) => Some(cname.cname().clone()),
        _ => None,
    }
}
