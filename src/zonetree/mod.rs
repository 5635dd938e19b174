//! The in-memory zone and answering queries from it.
//!
//! A [`Zone`] holds all records of a single authoritative zone. The apex
//! records live in an [`Apex`], all other records in a [`Tree`] ordered
//! canonically by owner name, grouped per owner into an [`Elem`].
//!
//! Queries are answered by [`Zone::lookup`] which resolves delegations,
//! wildcards, CNAME and DNAME records, and provides NSEC based denial of
//! existence for signed zones.

pub use self::answer::{Answer, LookupResult};
pub use self::elem::Elem;
pub use self::error::ZoneError;
pub use self::read::{Query, MAX_CNAME_CHAIN};
pub use self::tree::{Iter, Tree};
pub use self::zone::{Apex, Zone, ZoneContent};

mod answer;
mod elem;
mod error;
mod read;
mod tree;
mod xfr;
mod zone;
