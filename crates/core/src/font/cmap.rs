//! Embedded ToUnicode CMap parsing.
//!
//! A CMap program maps source character codes to destination codes via
//! `bfchar`/`bfrange` blocks. Parsing is line oriented: a small state
//! machine tracks which block kind is open and accumulates the block's
//! lines into an instruction buffer, which is then tokenized as a whole.

use super::CharCode;
use crate::error::{PdfError, Result};
use crate::tokenizer::{ObjectParser, Token};
use std::collections::HashMap;

/// Largest number of entries a single bfrange may expand to.
const MAX_RANGE_LEN: u32 = 256;

/// Block kind currently open while scanning the program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockMode {
    None,
    Char,
    Range,
}

/// Source-code to destination-code mapping built from one CMap program.
///
/// Immutable after construction; construction failure leaves nothing
/// partially built behind.
#[derive(Debug, Default)]
pub struct CMap {
    map: HashMap<u32, u32>,
}

impl CMap {
    /// Parse a CMap program.
    ///
    /// Fails with [`PdfError::Format`] if a bfrange destination is neither
    /// a single code nor a matching-arity sequence, or if a bfrange spans
    /// more than 256 entries.
    pub fn parse(data: &[u8]) -> Result<CMap> {
        let mut cmap = CMap::default();
        let text = String::from_utf8_lossy(data);

        let mut mode = BlockMode::None;
        let mut instructions = String::new();
        for line in text.split('\n') {
            if line.contains("beginbfchar") {
                mode = BlockMode::Char;
            } else if line.contains("endbfchar") {
                cmap.process_bfchar(instructions.as_bytes())?;
                instructions.clear();
                mode = BlockMode::None;
            } else if line.contains("beginbfrange") {
                mode = BlockMode::Range;
            } else if line.contains("endbfrange") {
                cmap.process_bfrange(instructions.as_bytes())?;
                instructions.clear();
                mode = BlockMode::None;
            } else if mode != BlockMode::None {
                instructions.push_str(line);
            }
        }

        Ok(cmap)
    }

    /// Number of source codes with a mapping.
    pub fn size(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Safe lookup of a numeric source code.
    pub fn get(&self, code: u32) -> Option<u32> {
        self.map.get(&code).copied()
    }

    /// Iterate over `(source, destination)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.map.iter().map(|(&src, &dst)| (src, dst))
    }

    /// Strict decode of one element.
    ///
    /// Glyph names pass through unchanged (already-resolved values are
    /// not this map's business); a numeric code absent from the mapping
    /// is [`PdfError::CMapLookup`] rather than a silent default.
    pub fn decode(&self, code: &CharCode) -> Result<CharCode> {
        match code {
            CharCode::Name(_) => Ok(code.clone()),
            CharCode::Code(c) => self
                .get(*c)
                .map(CharCode::Code)
                .ok_or(PdfError::CMapLookup(*c)),
        }
    }

    /// Read `(src, dst)` pairs until either value stops decoding.
    fn process_bfchar(&mut self, instructions: &[u8]) -> Result<()> {
        let mut parser = ObjectParser::new(instructions);
        while let (Some(src), Some(dst)) = (
            read_code(&mut parser)?.and_then(|t| str_to_int(&t)),
            read_code(&mut parser)?.and_then(|t| str_to_int(&t)),
        ) {
            self.map.insert(src, dst);
        }
        Ok(())
    }

    /// Read `(start, end, dst)` triples; `dst` is a single literal
    /// (contiguous form) or an array of literals (explicit form).
    fn process_bfrange(&mut self, instructions: &[u8]) -> Result<()> {
        let mut parser = ObjectParser::new(instructions);
        loop {
            let (Some(start), Some(end), Some(dst)) = (
                read_code(&mut parser)?,
                read_code(&mut parser)?,
                read_code(&mut parser)?,
            ) else {
                break;
            };
            let (Some(start), Some(end)) = (str_to_int(&start), str_to_int(&end)) else {
                break;
            };
            if end < start {
                continue;
            }
            let span = end - start + 1;

            match dst {
                Token::Str(_) => {
                    // Validated up front: no partial writes before failing.
                    if span > MAX_RANGE_LEN {
                        return Err(PdfError::Format(format!(
                            "a CMap bfrange can't exceed {MAX_RANGE_LEN} entries"
                        )));
                    }
                    let base = str_to_int(&dst).ok_or_else(|| {
                        PdfError::Format("unreadable bfrange destination".into())
                    })?;
                    for i in 0..span {
                        self.map.insert(start + i, base + i);
                    }
                }
                Token::Array(items) => {
                    if items.len() as u32 != span {
                        return Err(PdfError::Format(format!(
                            "bfrange destination arity {} does not match span {span}",
                            items.len()
                        )));
                    }
                    for (i, item) in items.iter().enumerate() {
                        let value = str_to_int(item).ok_or_else(|| {
                            PdfError::Format("unreadable bfrange destination".into())
                        })?;
                        self.map.insert(start + i as u32, value);
                    }
                }
                _ => {
                    return Err(PdfError::Format("invalid bfrange section".into()));
                }
            }
        }
        Ok(())
    }
}

/// Read the next literal object; `Ok(None)` is end of buffer.
fn read_code(parser: &mut ObjectParser) -> Result<Option<Token>> {
    match parser.next_object() {
        Some(Ok(token)) => Ok(Some(token)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Fixed-width big-endian integer decode of a string literal.
///
/// Empty and 3-or-more-byte literals decode to nothing; callers treat
/// that as loop termination, not an error. A decoded zero is a valid
/// code.
fn str_to_int(token: &Token) -> Option<u32> {
    match token {
        Token::Str(bytes) => match bytes[..] {
            [b] => Some(b as u32),
            [hi, lo] => Some(u16::from_be_bytes([hi, lo]) as u32),
            _ => None,
        },
        _ => None,
    }
}
