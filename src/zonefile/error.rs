//! Errors of the zonefile scanner.
//!
//! This is a private module. Its public types are re-exported by the parent.

use crate::base::scan::ScanError;
use std::fmt;
use std::sync::Arc;

//------------ EntryError ----------------------------------------------------

/// An error that happened while scanning a single entry.
#[derive(Clone, Debug)]
pub(super) struct EntryError(String);

impl EntryError {
    pub(super) fn unbalanced_parens() -> Self {
        EntryError("unbalanced parens".into())
    }

    pub(super) fn unterminated_quote() -> Self {
        EntryError("unterminated quoted string".into())
    }

    pub(super) fn missing_last_owner() -> Self {
        EntryError("missing last owner".into())
    }

    pub(super) fn missing_ttl() -> Self {
        EntryError("missing TTL and no $TTL given".into())
    }

    pub(super) fn missing_origin() -> Self {
        EntryError("missing origin".into())
    }

    pub(super) fn expected_rtype() -> Self {
        EntryError("expected rtype".into())
    }

    pub(super) fn unknown_control(ctrl: &str) -> Self {
        EntryError(format!("unknown control {}", ctrl))
    }

    pub(super) fn nested_include() -> Self {
        EntryError("too many nested $INCLUDE directives".into())
    }

    pub(super) fn include(path: &str, err: std::io::Error) -> Self {
        EntryError(format!("cannot read included file {}: {}", path, err))
    }

    pub(super) fn custom(msg: impl fmt::Display) -> Self {
        EntryError(msg.to_string())
    }
}

impl From<ScanError> for EntryError {
    fn from(err: ScanError) -> Self {
        EntryError(err.to_string())
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//------------ Error ---------------------------------------------------------

/// An error happened while scanning a zonefile.
///
/// The error knows the name of the file and the line the failing entry
/// started on and displays as `file:line: message`.
#[derive(Clone, Debug)]
pub struct Error {
    err: EntryError,
    file: Arc<str>,
    line: usize,
}

impl Error {
    pub(super) fn new(err: EntryError, file: Arc<str>, line: usize) -> Self {
        Error { err, file, line }
    }

    /// Returns the name of the file the error happened in.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the line the failing entry started on.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.err)
    }
}

impl std::error::Error for Error {}
