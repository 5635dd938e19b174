//! Parsing of data from its representation format.
//!
//! The zone file scanner splits an entry into tokens and hands the tokens
//! that make up the record data to the record type through the [`Scanner`]
//! trait. Types that can be read from tokens implement [`Scan`].

use super::name::Name;
use bytes::Bytes;
use core::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

//============ Scanning Traits ===============================================

//------------ Scan ---------------------------------------------------------

/// A type that can be scanned from its representation format.
pub trait Scan: Sized {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError>;
}

macro_rules! impl_scan_unsigned {
    ( $type:ident) => {
        impl Scan for $type {
            fn scan<S: Scanner + ?Sized>(
                scanner: &mut S,
            ) -> Result<Self, ScanError> {
                let token = scanner.expect_token()?;
                let mut res: $type = 0;
                for ch in token.symbols() {
                    res = res.checked_mul(10).ok_or_else(|| {
                        ScanError::custom("decimal number overflow")
                    })?;
                    res += ch.into_digit(10).map_err(|_| {
                        ScanError::custom("expected decimal number")
                    })? as $type;
                }
                Ok(res)
            }
        }
    };
}

impl_scan_unsigned!(u8);
impl_scan_unsigned!(u16);
impl_scan_unsigned!(u32);

impl Scan for Ipv4Addr {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        scanner
            .expect_token()?
            .as_str()
            .parse()
            .map_err(|_| ScanError::custom("expected IPv4 address"))
    }
}

impl Scan for Ipv6Addr {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        scanner
            .expect_token()?
            .as_str()
            .parse()
            .map_err(|_| ScanError::custom("expected IPv6 address"))
    }
}

impl Scan for Name {
    fn scan<S: Scanner + ?Sized>(scanner: &mut S) -> Result<Self, ScanError> {
        scanner.scan_name()
    }
}

//------------ Scanner -------------------------------------------------------

/// A type that can produce tokens of data in representation format.
pub trait Scanner {
    /// Returns the next token of the current entry.
    ///
    /// Returns `Ok(None)` once the entry is exhausted.
    fn scan_token(&mut self) -> Result<Option<Token>, ScanError>;

    /// Returns whether there are more tokens in the current entry.
    fn continues(&self) -> bool;

    /// Returns the origin relative names are attached to.
    fn origin(&self) -> &Name;

    /// Returns the next token or an error if the entry has ended.
    fn expect_token(&mut self) -> Result<Token, ScanError> {
        self.scan_token()?.ok_or_else(ScanError::end_of_entry)
    }

    /// Scans a token into a domain name.
    ///
    /// The token `@` stands for the origin. Names without a final dot
    /// are relative to the origin.
    fn scan_name(&mut self) -> Result<Name, ScanError> {
        let token = self.expect_token()?;
        if token.as_str() == "@" && !token.is_quoted() {
            return Ok(self.origin().clone());
        }
        Name::from_presentation(token.as_str(), Some(self.origin()))
            .map_err(ScanError::custom)
    }

    /// Scans a token into a character string.
    ///
    /// Character strings are limited to 255 octets.
    fn scan_charstr(&mut self) -> Result<Bytes, ScanError> {
        let octets = self.expect_token()?.into_octets()?;
        if octets.len() > 255 {
            return Err(ScanError::custom("character string too long"));
        }
        Ok(octets)
    }

    /// Returns all remaining tokens of the entry.
    fn scan_remaining(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut res = Vec::new();
        while let Some(token) = self.scan_token()? {
            res.push(token)
        }
        Ok(res)
    }
}

//------------ Token ---------------------------------------------------------

/// A single token of an entry.
///
/// The token keeps its text as it appeared in the source, including escape
/// sequences. Quoted tokens have their quotes removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, quoted: bool) -> Self {
        Token {
            text: text.into(),
            quoted,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns whether the token was enclosed in quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Returns an iterator over the symbols of the token.
    ///
    /// The iterator stops early at an illegal escape sequence.
    pub fn symbols(&self) -> Symbols<core::str::Chars<'_>> {
        Symbols::new(self.text.chars())
    }

    /// Converts the token into the octets it represents.
    pub fn into_octets(self) -> Result<Bytes, ScanError> {
        let mut chars = self.text.chars();
        let mut res = Vec::with_capacity(self.text.len());
        while let Some(symbol) =
            Symbol::from_chars(&mut chars).map_err(ScanError::custom)?
        {
            res.push(symbol.into_octet().map_err(ScanError::custom)?);
        }
        Ok(res.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

//------------ Symbol --------------------------------------------------------

/// The zone file representation of a single character.
///
/// This is either a regular character or an escape sequence. See the variants
/// for more details.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Symbol {
    /// An unescaped Unicode character.
    Char(char),

    /// A character escaped via a preceding backslash.
    ///
    /// This escape sequence is only allowed for printable ASCII characters.
    SimpleEscape(u8),

    /// A raw octet escaped using the decimal escape sequence.
    ///
    /// This escape sequence consists of a backslash followed by exactly three
    /// decimal digits with the value of the octets.
    DecimalEscape(u8),
}

impl Symbol {
    /// Reads a symbol from a character source.
    ///
    /// Returns the next symbol in the source, `Ok(None)` if the source has
    /// been exhausted, or an error if there wasn’t a valid symbol.
    pub fn from_chars<C>(chars: C) -> Result<Option<Self>, SymbolCharsError>
    where
        C: IntoIterator<Item = char>,
    {
        use self::SymbolCharsError::*;

        let mut chars = chars.into_iter();
        let ch = match chars.next() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        if ch != '\\' {
            return Ok(Some(Symbol::Char(ch)));
        }
        match chars.next() {
            Some(ch) => match ch.to_digit(10) {
                Some(first) => {
                    let second = chars
                        .next()
                        .ok_or(ShortInput)?
                        .to_digit(10)
                        .ok_or(BadEscape)?;
                    let third = chars
                        .next()
                        .ok_or(ShortInput)?
                        .to_digit(10)
                        .ok_or(BadEscape)?;
                    let res = first * 100 + second * 10 + third;
                    u8::try_from(res)
                        .map(|res| Some(Symbol::DecimalEscape(res)))
                        .map_err(|_| BadEscape)
                }
                None => {
                    let ch = u8::try_from(ch).map_err(|_| BadEscape)?;
                    if !(0x20..=0x7e).contains(&ch) {
                        Err(BadEscape)
                    } else {
                        Ok(Some(Symbol::SimpleEscape(ch)))
                    }
                }
            },
            None => Err(ShortInput),
        }
    }

    /// Provides the best symbol for an octet.
    ///
    /// The function will use the simple escape sequence for octet values that
    /// represent ASCII spaces, quotes, backslashes, and semicolons and the
    /// plain ASCII value for all other printable ASCII characters. Any other
    /// value is escaped using the decimal escape sequence.
    pub fn from_octet(ch: u8) -> Self {
        if ch == b' ' || ch == b'"' || ch == b'\\' || ch == b';' {
            Symbol::SimpleEscape(ch)
        } else if !(0x20..0x7F).contains(&ch) {
            Symbol::DecimalEscape(ch)
        } else {
            Symbol::Char(ch as char)
        }
    }

    /// Converts the symbol into an octet if it represents one.
    pub fn into_octet(self) -> Result<u8, BadSymbol> {
        match self {
            Symbol::Char(ch) => {
                if ('\u{20}'..='\u{7E}').contains(&ch) {
                    Ok(ch as u8)
                } else {
                    Err(BadSymbol(self))
                }
            }
            Symbol::SimpleEscape(ch) | Symbol::DecimalEscape(ch) => Ok(ch),
        }
    }

    /// Converts the symbol representing a digit into its integer value.
    pub fn into_digit(self, base: u32) -> Result<u32, BadSymbol> {
        if let Symbol::Char(ch) = self {
            match ch.to_digit(base) {
                Some(ch) => Ok(ch),
                None => Err(BadSymbol(self)),
            }
        } else {
            Err(BadSymbol(self))
        }
    }
}

//--- Display

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Symbol::Char(ch) => write!(f, "{}", ch),
            Symbol::SimpleEscape(ch) => write!(f, "\\{}", ch as char),
            Symbol::DecimalEscape(ch) => write!(f, "\\{:03}", ch),
        }
    }
}

//------------ Symbols -------------------------------------------------------

/// An iterator over the symbols in a char sequence.
#[derive(Clone, Debug)]
pub struct Symbols<Chars> {
    /// The chars of the sequence.
    ///
    /// This is an option so we can fuse the iterator on error.
    chars: Option<Chars>,
}

impl<Chars> Symbols<Chars> {
    /// Creates a new symbols iterator atop a char iterator.
    pub fn new(chars: Chars) -> Self {
        Symbols { chars: Some(chars) }
    }
}

impl<Chars: Iterator<Item = char>> Iterator for Symbols<Chars> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        if let Ok(res) = Symbol::from_chars(self.chars.as_mut()?) {
            return res;
        }
        self.chars = None;
        None
    }
}

//============ Error Types ===================================================

//------------ ScanError -----------------------------------------------------

/// An error happened while scanning record data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanError(String);

impl ScanError {
    /// Creates a new error wrapping a supplied error message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        ScanError(msg.to_string())
    }

    /// Creates an error when more tokens were expected in the entry.
    pub fn end_of_entry() -> Self {
        ScanError("unexpected end of entry".into())
    }

    /// Creates an error when there are trailing tokens in the entry.
    pub fn trailing_tokens() -> Self {
        ScanError("trailing data".into())
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ScanError {}

//------------ SymbolCharsError ----------------------------------------------

/// An error happened when reading a symbol.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolCharsError {
    /// An illegal escape sequence was encountered.
    BadEscape,

    /// Unexpected end of input.
    ///
    /// This can only happen in an escape sequence.
    ShortInput,
}

impl fmt::Display for SymbolCharsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SymbolCharsError::BadEscape => {
                f.write_str("illegal escape sequence")
            }
            SymbolCharsError::ShortInput => {
                f.write_str("unexpected end of input")
            }
        }
    }
}

impl std::error::Error for SymbolCharsError {}

//------------ BadSymbol -----------------------------------------------------

/// A symbol of an unexepected value was encountered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BadSymbol(pub Symbol);

impl fmt::Display for BadSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bad symbol '{}'", self.0)
    }
}

impl std::error::Error for BadSymbol {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn symbol_from_chars() {
        let mut chars = "a\\.\\065\\0".chars();
        assert_eq!(
            Symbol::from_chars(&mut chars),
            Ok(Some(Symbol::Char('a')))
        );
        assert_eq!(
            Symbol::from_chars(&mut chars),
            Ok(Some(Symbol::SimpleEscape(b'.')))
        );
        assert_eq!(
            Symbol::from_chars(&mut chars),
            Ok(Some(Symbol::DecimalEscape(65)))
        );
        assert_eq!(
            Symbol::from_chars(&mut chars),
            Err(SymbolCharsError::ShortInput)
        );
        assert_eq!(
            Symbol::from_chars("\\300".chars()),
            Err(SymbolCharsError::BadEscape)
        );
    }

    #[test]
    fn token_into_octets() {
        assert_eq!(
            Token::new("a\\\"b\\010", true).into_octets().unwrap().as_ref(),
            b"a\"b\n"
        );
        assert!(Token::new("caf\u{e9}", false).into_octets().is_err());
    }
}
