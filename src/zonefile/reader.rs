//! The zonefile scanner.
//!
//! This is a private module. Its public types are re-exported by the parent.

use super::error::{EntryError, Error};
use super::source::{RawEntry, Source};
use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::{Record, Ttl};
use crate::base::scan::{ScanError, Scanner, Token};
use crate::rdata::ZoneRecordData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

/// The maximum depth of nested `$INCLUDE` directives.
const MAX_INCLUDE_DEPTH: usize = 16;

//------------ Zonefile ------------------------------------------------------

/// A zonefile to be scanned.
///
/// A value of this type holds the text of a zonefile in memory and hands
/// out the records it contains by acting as an iterator. The
/// [`next_record`][Self::next_record] method provides an alternative with a
/// more question mark friendly signature.
///
/// Relative names are attached to the current origin. The initial origin
/// can be given via [`set_origin`][Self::set_origin] and is changed by
/// `$ORIGIN` directives. A missing TTL is taken from the last `$TTL`
/// directive or, failing that, from the previous record. A missing class
/// is taken from the previous record and defaults to IN.
///
/// Files named by `$INCLUDE` directives are read and scanned before the
/// scanner continues after the directive. Relative paths are resolved
/// against the include directory which defaults to the directory of the
/// file given to [`load`][Self::load]. Origin and last owner are restored
/// when an included file ends.
#[derive(Clone, Debug)]
pub struct Zonefile {
    /// The stack of sources currently scanned.
    ///
    /// The last element is the innermost included file.
    sources: Vec<Frame>,

    /// The current origin.
    origin: Option<Name>,

    /// The last owner.
    last_owner: Option<Name>,

    /// The last explicitly given TTL.
    last_ttl: Option<Ttl>,

    /// The TTL set by the `$TTL` directive.
    default_ttl: Option<Ttl>,

    /// The last class.
    last_class: Option<Class>,

    /// The directory relative include paths are resolved against.
    include_dir: Option<PathBuf>,
}

/// A source together with the state to restore once it ends.
#[derive(Clone, Debug)]
struct Frame {
    source: Source,
    saved_origin: Option<Name>,
    saved_owner: Option<Name>,
}

impl Zonefile {
    /// Creates a scanner for the given text.
    ///
    /// The name is used in error messages only.
    pub fn new(name: impl AsRef<str>, text: impl Into<String>) -> Self {
        Zonefile {
            sources: vec![Frame {
                source: Source::new(name.as_ref().into(), text.into()),
                saved_origin: None,
                saved_owner: None,
            }],
            origin: None,
            last_owner: None,
            last_ttl: None,
            default_ttl: None,
            last_class: None,
            include_dir: None,
        }
    }

    /// Creates a scanner by loading the file at the given path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut res = Self::new(path.display().to_string(), text);
        res.include_dir = path.parent().map(Path::to_path_buf);
        Ok(res)
    }

    /// Sets the origin of the zonefile.
    ///
    /// The origin is appended to relative domain names encountered in the
    /// data. Initially, there is no origin set. If relative names are
    /// encountered, an error happens.
    pub fn set_origin(&mut self, origin: Name) {
        self.origin = Some(origin)
    }

    /// Sets the directory relative `$INCLUDE` paths are resolved against.
    pub fn set_include_dir(&mut self, dir: impl Into<PathBuf>) {
        self.include_dir = Some(dir.into())
    }

    /// Returns the next record in the zonefile.
    ///
    /// Returns `Ok(None)` if the end of the file has been reached. Returns
    /// an error if scanning the next entry failed. Scanning can continue
    /// with the entry after the failed one.
    pub fn next_record(&mut self) -> Result<Option<Record>, Error> {
        loop {
            let frame = match self.sources.last_mut() {
                Some(frame) => frame,
                None => return Ok(None),
            };
            let entry = match frame.source.next_entry()? {
                Some(entry) => entry,
                None => {
                    if let Some(frame) = self.sources.pop() {
                        if !self.sources.is_empty() {
                            self.origin = frame.saved_origin;
                            self.last_owner = frame.saved_owner;
                        }
                    }
                    continue;
                }
            };
            let line = entry.line;
            match self.scan_entry(entry) {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => {}
                Err(err) => return Err(self.error(err, line)),
            }
        }
    }

    /// Creates an error for the current source.
    fn error(&self, err: EntryError, line: usize) -> Error {
        match self.sources.last() {
            Some(frame) => frame.source.error(err, line),
            None => Error::new(err, "".into(), line),
        }
    }

    /// Returns the name of the current source.
    fn source_name(&self) -> Arc<str> {
        self.sources
            .last()
            .map(|frame| frame.source.name().clone())
            .unwrap_or_else(|| "".into())
    }

    /// Scans a single entry.
    ///
    /// Returns `Ok(None)` for control entries.
    fn scan_entry(
        &mut self,
        entry: RawEntry,
    ) -> Result<Option<Record>, EntryError> {
        let mut scanner = EntryScanner::new(entry.tokens, self.origin.clone());
        if entry.indented {
            let owner = self
                .last_owner
                .clone()
                .ok_or_else(EntryError::missing_last_owner)?;
            return self.scan_record(owner, &mut scanner).map(Some);
        }
        let first = scanner.peek_token().ok_or_else(ScanError::end_of_entry)?;
        if !first.is_quoted() && first.as_str().starts_with('$') {
            self.scan_control(&mut scanner)?;
            return Ok(None);
        }
        let owner = scanner.scan_owner()?;
        self.last_owner = Some(owner.clone());
        self.scan_record(owner, &mut scanner).map(Some)
    }

    /// Scans the remainder of a record entry after the owner.
    fn scan_record(
        &mut self,
        owner: Name,
        scanner: &mut EntryScanner,
    ) -> Result<Record, EntryError> {
        let (class, ttl, rtype) = scanner.scan_ctr()?;

        let class = match class {
            Some(class) => {
                self.last_class = Some(class);
                class
            }
            None => self.last_class.unwrap_or_default(),
        };

        let ttl = match ttl {
            Some(ttl) => {
                self.last_ttl = Some(ttl);
                ttl
            }
            None => self
                .default_ttl
                .or(self.last_ttl)
                .ok_or_else(EntryError::missing_ttl)?,
        };

        let data = ZoneRecordData::scan(rtype, scanner)?;
        if scanner.continues() {
            return Err(ScanError::trailing_tokens().into());
        }
        Ok(Record::new(owner, class, ttl, data))
    }

    /// Scans a control directive.
    fn scan_control(
        &mut self,
        scanner: &mut EntryScanner,
    ) -> Result<(), EntryError> {
        let ctrl = scanner.expect_token()?;
        let ctrl = ctrl.as_str();
        if ctrl.eq_ignore_ascii_case("$ORIGIN") {
            let origin = scanner.scan_owner()?;
            self.origin = Some(origin);
        } else if ctrl.eq_ignore_ascii_case("$TTL") {
            let ttl = scanner
                .expect_token()?
                .as_str()
                .parse()
                .map_err(EntryError::custom)?;
            self.default_ttl = Some(ttl);
        } else if ctrl.eq_ignore_ascii_case("$INCLUDE") {
            let path = scanner.expect_token()?;
            let origin = if scanner.continues() {
                Some(scanner.scan_owner()?)
            } else {
                None
            };
            if scanner.continues() {
                return Err(ScanError::trailing_tokens().into());
            }
            self.include(path.as_str(), origin)?;
            return Ok(());
        } else {
            return Err(EntryError::unknown_control(ctrl));
        }
        if scanner.continues() {
            return Err(ScanError::trailing_tokens().into());
        }
        Ok(())
    }

    /// Starts scanning an included file.
    fn include(
        &mut self,
        path: &str,
        origin: Option<Name>,
    ) -> Result<(), EntryError> {
        if self.sources.len() > MAX_INCLUDE_DEPTH {
            return Err(EntryError::nested_include());
        }
        let full_path = match self.include_dir {
            Some(ref dir) => dir.join(path),
            None => PathBuf::from(path),
        };
        let text = fs::read_to_string(&full_path)
            .map_err(|err| EntryError::include(path, err))?;
        tracing::trace!(
            "{}: including {}",
            self.source_name(),
            full_path.display()
        );
        let saved_origin = self.origin.clone();
        let saved_owner = self.last_owner.clone();
        if let Some(origin) = origin {
            self.origin = Some(origin);
        }
        self.sources.push(Frame {
            source: Source::new(
                full_path.display().to_string().into(),
                text,
            ),
            saved_origin,
            saved_owner,
        });
        Ok(())
    }
}

impl Iterator for Zonefile {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

//------------ EntryScanner --------------------------------------------------

/// The scanner for the tokens of a single entry.
///
/// It implements the [`Scanner`] interface used by the record data types.
#[derive(Debug)]
struct EntryScanner {
    tokens: std::vec::IntoIter<Token>,
    origin: Option<Name>,
    root: Name,
}

impl EntryScanner {
    fn new(tokens: Vec<Token>, origin: Option<Name>) -> Self {
        EntryScanner {
            tokens: tokens.into_iter(),
            origin,
            root: Name::root(),
        }
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.as_slice().first()
    }

    /// Scans an owner name.
    ///
    /// Relative names require an origin.
    fn scan_owner(&mut self) -> Result<Name, EntryError> {
        let token = self.expect_token()?;
        let text = token.as_str();
        let origin = self.origin.as_ref();
        if text == "@" && !token.is_quoted() {
            return origin.cloned().ok_or_else(EntryError::missing_origin);
        }
        let relative = !text.ends_with('.') || text.ends_with("\\.");
        if relative && origin.is_none() {
            return Err(EntryError::missing_origin());
        }
        Name::from_presentation(text, origin).map_err(EntryError::custom)
    }

    /// Scans the TTL, class, and type portions of a regular record.
    fn scan_ctr(
        &mut self,
    ) -> Result<(Option<Class>, Option<Ttl>, Rtype), EntryError> {
        // Possible options are:
        //
        //   [<TTL>] [<class>] <type>
        //   [<class>] [<TTL>] <type>
        let mut class = None;
        let mut ttl = None;
        loop {
            let token = self.expect_token()?;
            let text = token.as_str();
            if ttl.is_none() {
                if let Ok(value) = text.parse::<Ttl>() {
                    ttl = Some(value);
                    continue;
                }
            }
            if let Ok(rtype) = text.parse::<Rtype>() {
                return Ok((class, ttl, rtype));
            }
            if class.is_none() {
                if let Ok(value) = text.parse::<Class>() {
                    class = Some(value);
                    continue;
                }
            }
            return Err(EntryError::expected_rtype());
        }
    }
}

impl Scanner for EntryScanner {
    fn scan_token(&mut self) -> Result<Option<Token>, ScanError> {
        Ok(self.tokens.next())
    }

    fn continues(&self) -> bool {
        self.tokens.len() > 0
    }

    fn origin(&self) -> &Name {
        self.origin.as_ref().unwrap_or(&self.root)
    }
}

//============ Testing =======================================================
