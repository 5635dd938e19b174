//! The answer to a query.

use crate::base::iana::Rcode;
use crate::base::record::Record;
use core::fmt;

//------------ LookupResult --------------------------------------------------

/// The classification of a lookup’s outcome.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LookupResult {
    /// Records were found.
    Success,

    /// The name exists but has no records of the requested type.
    NoData,

    /// The name does not exist.
    NameError,

    /// The name is below a delegation.
    Delegation,

    /// The zone couldn’t answer.
    ServerFailure,
}

impl LookupResult {
    /// Returns the response code for an answer with this result.
    pub fn rcode(self) -> Rcode {
        match self {
            LookupResult::Success
            | LookupResult::NoData
            | LookupResult::Delegation => Rcode::NOERROR,
            LookupResult::NameError => Rcode::NXDOMAIN,
            LookupResult::ServerFailure => Rcode::SERVFAIL,
        }
    }

    /// Returns the result for a response code received from upstream.
    ///
    /// A successful response with an empty answer means no data.
    pub fn from_upstream(rcode: Rcode, empty_answer: bool) -> Self {
        match rcode {
            Rcode::NXDOMAIN => LookupResult::NameError,
            Rcode::SERVFAIL => LookupResult::ServerFailure,
            Rcode::NOERROR if empty_answer => LookupResult::NoData,
            _ => LookupResult::Success,
        }
    }
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookupResult::Success => "success",
            LookupResult::NoData => "no data",
            LookupResult::NameError => "name error",
            LookupResult::Delegation => "delegation",
            LookupResult::ServerFailure => "server failure",
        })
    }
}

//------------ Answer --------------------------------------------------------

/// The records answering a query together with its classification.
#[derive(Clone, Debug)]
pub struct Answer {
    answer: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,
    result: LookupResult,
}

impl Answer {
    /// Creates an empty answer with the given result.
    pub fn new(result: LookupResult) -> Self {
        Answer {
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            result,
        }
    }

    /// Creates an empty server failure answer.
    pub fn server_failure() -> Self {
        Self::new(LookupResult::ServerFailure)
    }

    /// Sets the answer section.
    pub fn with_answer(mut self, answer: Vec<Record>) -> Self {
        self.answer = answer;
        self
    }

    /// Sets the authority section.
    pub fn with_authority(mut self, authority: Vec<Record>) -> Self {
        self.authority = authority;
        self
    }

    /// Sets the additional section.
    pub fn with_additional(mut self, additional: Vec<Record>) -> Self {
        self.additional = additional;
        self
    }

    /// The records for the answer section.
    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    /// The records for the authority section.
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    /// The records for the additional section.
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Returns the result of the lookup.
    pub fn result(&self) -> LookupResult {
        self.result
    }

    /// Returns the rcode for a response carrying this answer.
    pub fn rcode(&self) -> Rcode {
        self.result.rcode()
    }

    pub(super) fn extend_answer(&mut self, records: Vec<Record>) {
        self.answer.extend(records)
    }

    pub(super) fn set_result(&mut self, result: LookupResult) {
        self.result = result
    }

    /// Converts the answer into its three sections.
    pub fn into_sections(self) -> (Vec<Record>, Vec<Record>, Vec<Record>) {
        (self.answer, self.authority, self.additional)
    }
}
