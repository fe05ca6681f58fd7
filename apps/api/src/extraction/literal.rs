//! Strict parser for list-of-strings literals such as `["a", 'b',]`.
//!
//! Accepts only a bracketed, comma-separated sequence of quoted string
//! literals. Anything else is rejected; nothing is ever evaluated.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("expected '[' at offset {0}")]
    ExpectedOpenBracket(usize),

    #[error("unexpected {found} at offset {offset}, expected ',' or ']'")]
    ExpectedSeparator { found: String, offset: usize },

    #[error("element at offset {0} is not a string literal")]
    NotAString(usize),

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("trailing characters after list at offset {0}")]
    TrailingInput(usize),
}

/// Parses `input` as a list of string literals.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    let items = parser.list()?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(items),
        Some((offset, _)) => Err(LiteralError::TrailingInput(offset)),
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.peek();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn list(&mut self) -> Result<Vec<String>, LiteralError> {
        self.skip_ws();
        match self.bump() {
            Some((_, '[')) => {}
            Some((offset, _)) => return Err(LiteralError::ExpectedOpenBracket(offset)),
            None => return Err(LiteralError::UnexpectedEnd),
        }

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some((_, ']')) => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some((_, '"' | '\'')) => items.push(self.string()?),
                Some((offset, _)) => return Err(LiteralError::NotAString(offset)),
                None => return Err(LiteralError::UnexpectedEnd),
            }

            self.skip_ws();
            match self.bump() {
                Some((_, ',')) => {}
                Some((_, ']')) => return Ok(items),
                Some((offset, c)) => {
                    return Err(LiteralError::ExpectedSeparator {
                        found: format!("'{c}'"),
                        offset,
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let (start, quote) = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();

        loop {
            match self.bump() {
                None => return Err(LiteralError::UnterminatedString(start)),
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\n')) => return Err(LiteralError::UnterminatedString(start)),
                Some((offset, '\\')) => self.escape(offset, &mut out)?,
                Some((_, c)) => out.push(c),
            }
        }
    }

    /// Decodes the escape following a backslash into `out`.
    ///
    /// A line continuation emits nothing. Unrecognised escapes are kept
    /// verbatim, backslash included.
    fn escape(&mut self, offset: usize, out: &mut String) -> Result<(), LiteralError> {
        let (_, c) = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        let decoded = match c {
            '\n' => return Ok(()),
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '0'..='7' => self.octal(c, offset)?,
            'x' => self.hex(2, offset)?,
            'u' => self.hex(4, offset)?,
            'U' => self.hex(8, offset)?,
            other => {
                out.push('\\');
                other
            }
        };
        out.push(decoded);
        Ok(())
    }

    /// Up to three octal digits, the first already consumed.
    fn octal(&mut self, first: char, offset: usize) -> Result<char, LiteralError> {
        let mut value = first.to_digit(8).ok_or(LiteralError::InvalidEscape(offset))?;
        for _ in 0..2 {
            match self.peek().and_then(|(_, c)| c.to_digit(8)) {
                Some(digit) => {
                    value = value * 8 + digit;
                    self.pos += 1;
                }
                None => break,
            }
        }
        char::from_u32(value).ok_or(LiteralError::InvalidEscape(offset))
    }

    fn hex(&mut self, digits: usize, offset: usize) -> Result<char, LiteralError> {
        let mut value = 0u32;
        for _ in 0..digits {
            let (_, c) = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            let digit = c.to_digit(16).ok_or(LiteralError::InvalidEscape(offset))?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or(LiteralError::InvalidEscape(offset))
    }
}
