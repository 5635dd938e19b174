//! Domain names.
//!
//! Domain names are a sequence of *labels* which are in turn a sequence of
//! up to 63 octets. While they are limited to a subset of ASCII by
//! convention, all octet values are allowed. In their wire-format
//! representation labels are prefixed with an octet containing the number
//! of octets in the label. The labels in a domain name are nominally arranged
//! backwards. That is, the ‘most significant’ label is the last one. In an
//! *absolute* domain name, this last label is an empty label, called the
//! *root label* and indicating the root of the domain name tree.
//!
//! Zone data only ever deals with absolute names, so there is a single
//! name type, [`Name`], that keeps a name in uncompressed wire format.
//! Relative names only appear in zone files and are made absolute by the
//! scanner using [`Name::from_presentation`].

pub use self::absolute::{Labels, Name, NameError};
pub use self::label::{Label, LongLabelError};

mod absolute;
mod label;
