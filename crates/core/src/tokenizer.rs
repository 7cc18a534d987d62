//! PostScript-object tokenizer.
//!
//! Supplies the "read next primitive literal, then skip whitespace"
//! operation the CMap and Encoding machinery consumes. End of stream is
//! reported distinctly from a malformed literal: [`Lexer::next_token`] and
//! [`ObjectParser::next_object`] return `None` when the input is
//! exhausted and `Some(Err(_))` when a literal cannot be read.

use crate::error::{PdfError, Result};
use std::collections::HashMap;

/// A primitive PostScript/PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Boolean value
    Bool(bool),
    /// Literal name (e.g., /Differences)
    Name(String),
    /// String, from either a literal `(..)` or a hex `<..>` form
    Str(Vec<u8>),
    /// Keyword/operator (e.g., beginbfchar)
    Keyword(Vec<u8>),
    /// Array
    Array(Vec<Token>),
    /// Dictionary
    Dict(HashMap<String, Token>),
}

/// Byte-level tokenizer over a slice.
///
/// Position is slice-indexed, so boundary handling at stream end cannot
/// lose or duplicate bytes.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in the stream.
    pub fn tell(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
    }

    fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    /// Skip whitespace and `%` comments.
    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) {
                self.advance();
            } else if b == b'%' {
                while let Some(c) = self.advance() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Parse a literal name (/Name), handling `#xx` hex escapes.
    fn read_name(&mut self) -> Result<Token> {
        self.advance(); // skip '/'
        let mut name = Vec::new();

        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) || Self::is_delimiter(b) {
                break;
            }
            if b == b'#' {
                if let (Some(c1), Some(c2)) = (self.peek_at(1), self.peek_at(2))
                    && c1.is_ascii_hexdigit()
                    && c2.is_ascii_hexdigit()
                {
                    self.advance();
                    self.advance();
                    self.advance();
                    name.push(hex_nibble(c1) << 4 | hex_nibble(c2));
                    continue;
                }
                // Invalid hex escape: the '#' is dropped, following bytes kept
                self.advance();
            } else {
                name.push(b);
                self.advance();
            }
        }

        Ok(Token::Name(String::from_utf8_lossy(&name).into_owned()))
    }

    /// Parse an integer or real number.
    fn read_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut has_dot = false;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.advance();
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let s = std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| PdfError::Token {
            pos: start,
            msg: "invalid number".into(),
        })?;
        if has_dot {
            let val: f64 = s.parse().map_err(|_| PdfError::Token {
                pos: start,
                msg: format!("invalid real: {s}"),
            })?;
            Ok(Token::Real(val))
        } else {
            let val: i64 = s.parse().map_err(|_| PdfError::Token {
                pos: start,
                msg: format!("invalid int: {s}"),
            })?;
            Ok(Token::Int(val))
        }
    }

    /// Parse a literal string `(...)` with nesting and escapes.
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // skip '('
        let mut result = Vec::new();
        let mut depth = 1usize;

        while depth > 0 {
            match self.advance() {
                Some(b'(') => {
                    depth += 1;
                    result.push(b'(');
                }
                Some(b')') => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                Some(b'\\') => match self.advance() {
                    Some(b'n') => result.push(b'\n'),
                    Some(b'r') => result.push(b'\r'),
                    Some(b't') => result.push(b'\t'),
                    Some(b'b') => result.push(0x08),
                    Some(b'f') => result.push(0x0c),
                    Some(b'(') => result.push(b'('),
                    Some(b')') => result.push(b')'),
                    Some(b'\\') => result.push(b'\\'),
                    Some(b'\r') => {
                        // line continuation, swallow optional \n
                        if self.peek() == Some(b'\n') {
                            self.advance();
                        }
                    }
                    Some(b'\n') => {}
                    Some(c) if (b'0'..b'8').contains(&c) => {
                        let mut octal = (c - b'0') as u32;
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d) if (b'0'..b'8').contains(&d) => {
                                    self.advance();
                                    octal = octal * 8 + (d - b'0') as u32;
                                }
                                _ => break,
                            }
                        }
                        result.push((octal & 0xff) as u8);
                    }
                    Some(c) => result.push(c),
                    None => return Err(PdfError::UnexpectedEof),
                },
                Some(c) => result.push(c),
                None => return Err(PdfError::UnexpectedEof),
            }
        }

        Ok(Token::Str(result))
    }

    /// Parse a hex string `<...>`. Digit pairs become bytes; a lone
    /// trailing digit becomes its own low-nibble byte.
    fn read_hex_string(&mut self) -> Result<Token> {
        self.advance(); // skip '<'
        let mut digits = Vec::new();

        loop {
            match self.peek() {
                Some(b'>') => {
                    self.advance();
                    break;
                }
                Some(c) if c.is_ascii_hexdigit() => {
                    self.advance();
                    digits.push(c);
                }
                Some(c) if Self::is_whitespace(c) => {
                    self.advance();
                }
                Some(_) => break,
                None => return Err(PdfError::UnexpectedEof),
            }
        }

        let mut result = Vec::with_capacity(digits.len().div_ceil(2));
        let mut chunks = digits.chunks_exact(2);
        for pair in &mut chunks {
            result.push(hex_nibble(pair[0]) << 4 | hex_nibble(pair[1]));
        }
        if let [lone] = chunks.remainder() {
            result.push(hex_nibble(*lone));
        }
        Ok(Token::Str(result))
    }

    /// Parse a bare keyword, recognizing the boolean literals.
    fn read_keyword(&mut self) -> Result<Token> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) || Self::is_delimiter(b) {
                break;
            }
            self.advance();
        }
        match &self.data[start..self.pos] {
            b"true" => Ok(Token::Bool(true)),
            b"false" => Ok(Token::Bool(false)),
            kw => Ok(Token::Keyword(kw.to_vec())),
        }
    }

    /// Get the next token. `None` means end of stream.
    pub fn next_token(&mut self) -> Option<Result<(usize, Token)>> {
        self.skip_whitespace();
        if self.at_end() {
            return None;
        }

        let token_pos = self.pos;
        let b = self.peek()?;
        let result = match b {
            b'/' => self.read_name(),
            b'(' => self.read_string(),
            b'<' => {
                if self.peek_at(1) == Some(b'<') {
                    self.pos += 2;
                    Ok(Token::Keyword(b"<<".to_vec()))
                } else {
                    self.read_hex_string()
                }
            }
            b'>' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Ok(Token::Keyword(b">>".to_vec()))
            }
            b'[' | b']' => {
                self.advance();
                Ok(Token::Keyword(vec![b]))
            }
            b'+' | b'-' | b'.' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit())
                    || (b != b'.' && self.peek_at(1) == Some(b'.'))
                {
                    self.read_number()
                } else {
                    self.read_keyword()
                }
            }
            c if c.is_ascii_digit() => self.read_number(),
            _ => self.read_keyword(),
        };

        Some(result.map(|token| (token_pos, token)))
    }
}

fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

/// Composite container being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Array,
    Dict,
}

/// Object-level reader: composes arrays and dictionaries from tokens and
/// skips bare keywords between objects.
pub struct ObjectParser<'a> {
    lexer: Lexer<'a>,
    frames: Vec<(Context, Vec<Token>)>,
}

impl<'a> ObjectParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            frames: Vec::new(),
        }
    }

    /// Current position in the stream.
    pub fn tell(&self) -> usize {
        self.lexer.tell()
    }

    /// Read the next complete object. `None` means end of stream.
    pub fn next_object(&mut self) -> Option<Result<Token>> {
        loop {
            let token = match self.lexer.next_token() {
                Some(Ok((_, token))) => token,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    // A container left open at stream end is malformed,
                    // not merely exhausted.
                    if self.frames.is_empty() {
                        return None;
                    }
                    return Some(Err(PdfError::UnexpectedEof));
                }
            };

            let completed = match token {
                Token::Keyword(kw) if kw == b"[" => {
                    self.frames.push((Context::Array, Vec::new()));
                    continue;
                }
                Token::Keyword(kw) if kw == b"<<" => {
                    self.frames.push((Context::Dict, Vec::new()));
                    continue;
                }
                Token::Keyword(kw) if kw == b"]" => match self.frames.pop() {
                    Some((Context::Array, items)) => Token::Array(items),
                    _ => {
                        return Some(Err(PdfError::Token {
                            pos: self.lexer.tell(),
                            msg: "unmatched ]".into(),
                        }));
                    }
                },
                Token::Keyword(kw) if kw == b">>" => match self.frames.pop() {
                    Some((Context::Dict, items)) => {
                        let mut dict = HashMap::new();
                        let mut iter = items.into_iter();
                        while let Some(key) = iter.next() {
                            if let Token::Name(name) = key
                                && let Some(value) = iter.next()
                            {
                                dict.insert(name, value);
                            }
                        }
                        Token::Dict(dict)
                    }
                    _ => {
                        return Some(Err(PdfError::Token {
                            pos: self.lexer.tell(),
                            msg: "unmatched >>".into(),
                        }));
                    }
                },
                // Bare keywords between objects carry no value here
                Token::Keyword(_) => continue,
                other => other,
            };

            match self.frames.last_mut() {
                Some((_, items)) => items.push(completed),
                None => return Some(Ok(completed)),
            }
        }
    }
}
