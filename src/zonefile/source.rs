//! Splitting zonefile text into entries and tokens.

use super::error::{EntryError, Error};
use crate::base::scan::Token;
use std::sync::Arc;

//------------ RawEntry ------------------------------------------------------

/// The tokens of a single entry.
///
/// An entry ends at the first line feed outside of parentheses.
#[derive(Clone, Debug)]
pub(super) struct RawEntry {
    /// Whether the entry started with white space.
    ///
    /// Such an entry has no owner of its own and uses the last owner.
    pub indented: bool,

    /// The tokens of the entry in order.
    pub tokens: Vec<Token>,

    /// The line the entry starts on.
    pub line: usize,
}

//------------ Source --------------------------------------------------------

/// The text of one zonefile.
#[derive(Clone, Debug)]
pub(super) struct Source {
    /// The name of the file used in error messages.
    name: Arc<str>,

    /// The complete text of the file.
    text: String,

    /// The byte position of the next character.
    pos: usize,

    /// The current line number, starting at 1.
    line: usize,
}

impl Source {
    pub fn new(name: Arc<str>, text: String) -> Self {
        Source {
            name,
            text,
            pos: 0,
            line: 1,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Creates an error for the given line of this source.
    pub fn error(&self, err: EntryError, line: usize) -> Error {
        Error::new(err, self.name.clone(), line)
    }

    /// Returns the next non-empty entry.
    ///
    /// Returns `Ok(None)` once the end of the text has been reached.
    pub fn next_entry(&mut self) -> Result<Option<RawEntry>, Error> {
        while self.peek().is_some() {
            let line = self.line;
            let indented = matches!(self.peek(), Some(' ' | '\t'));
            let tokens = self
                .scan_tokens()
                .map_err(|err| self.error(err, line))?;
            if !tokens.is_empty() {
                return Ok(Some(RawEntry {
                    indented,
                    tokens,
                    line,
                }));
            }
        }
        Ok(None)
    }

    /// Scans the tokens up to the end of the entry.
    fn scan_tokens(&mut self) -> Result<Vec<Token>, EntryError> {
        let mut tokens = Vec::new();
        let mut parens = 0usize;
        loop {
            match self.peek() {
                None => {
                    if parens > 0 {
                        return Err(EntryError::unbalanced_parens());
                    }
                    return Ok(tokens);
                }
                Some('\n') => {
                    self.bump();
                    if parens == 0 {
                        return Ok(tokens);
                    }
                }
                Some(' ' | '\t' | '\r') => self.bump(),
                Some(';') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('(') => {
                    parens += 1;
                    self.bump();
                }
                Some(')') => {
                    parens = parens
                        .checked_sub(1)
                        .ok_or_else(EntryError::unbalanced_parens)?;
                    self.bump();
                }
                Some('"') => {
                    self.bump();
                    tokens.push(self.scan_quoted()?);
                }
                Some(_) => tokens.push(self.scan_unquoted()),
            }
        }
    }

    /// Scans a quoted token after the opening quote.
    fn scan_quoted(&mut self) -> Result<Token, EntryError> {
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(EntryError::unterminated_quote()),
                Some('"') => {
                    self.bump();
                    return Ok(Token::new(text, true));
                }
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.peek() {
                        Some(ch) => {
                            text.push(ch);
                            self.bump();
                        }
                        None => return Err(EntryError::unterminated_quote()),
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
    }

    /// Scans an unquoted token.
    ///
    /// Escape sequences are kept in the token text.
    fn scan_unquoted(&mut self) -> Token {
        let mut text = String::new();
        loop {
            match self.peek() {
                None
                | Some(' ' | '\t' | '\r' | '\n' | ';' | '(' | ')' | '"') => {
                    return Token::new(text, false);
                }
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    if let Some(ch) = self.peek() {
                        text.push(ch);
                        self.bump();
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
            }
        }
    }
}

//============ Testing =======================================================
