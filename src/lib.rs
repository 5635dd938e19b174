//! An authoritative DNS zone engine.
//!
//! This crate keeps the records of authoritative zones in memory and
//! answers queries from them. It covers delegations, wildcards, CNAME and
//! DNAME records as well as DNSSEC denial of existence for signed zones.
//! Zones can be loaded from zone files, reloaded when their file changes,
//! and transferred from a primary name server.
//!
//! The crate doesn’t deal with DNS messages on the wire. It takes decoded
//! queries and produces the records for the sections of a response. All
//! communication with other name servers goes through capabilities given
//! to the zone.
//!
//! # Modules
//!
//! * [base] contains the fundamental types such as domain names, record
//!   types, serial numbers, and records,
//! * [rdata] contains the record data of the record types the engine
//!   looks into,
//! * [zonefile] reads records from zone files,
//! * [zonetree] provides the zone itself and answers queries, and
//! * [zonemaintenance] reloads, transfers, and refreshes zones.
//!
//! # Example
//!
//! ```
//! use authzone::base::{Name, Rtype};
//! use authzone::zonetree::{LookupResult, Query, Zone};
//!
//! let text = "\
//! $TTL 3600
//! @    SOA ns1 hostmaster 1 7200 3600 1209600 300
//!      NS  ns1
//! ns1  A   192.0.2.53
//! www  A   192.0.2.80
//! ";
//! let origin: Name = "example.org.".parse().unwrap();
//! let zone = Zone::parse(text.as_bytes(), origin, "example.org.zone", None)
//!     .unwrap();
//! let query = Query::new("www.example.org.".parse().unwrap(), Rtype::A);
//! let answer = tokio_test::block_on(zone.lookup(&query));
//! assert_eq!(answer.result(), LookupResult::Success);
//! assert_eq!(answer.answer().len(), 1);
//! ```

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod rdata;
pub mod zonefile;
pub mod zonemaintenance;
pub mod zonetree;
