//! Character encodings and the byte-run to UTF-8 pipeline.
//!
//! An [`Encoding`] is a static code-to-Unicode table (or an identity
//! passthrough) plus a per-font sparse Differences override. Its
//! [`to_utf8`](Encoding::to_utf8) method is the end-to-end decode
//! pipeline for one show-text operand:
//!
//! * unpack raw bytes into fixed-width codes
//! * replace codes that have Differences entries with their override
//! * resolve each element to a Unicode scalar through an ordered tier
//!   cascade (ToUnicode CMap, forced placeholder, static table, control
//!   range, passthrough)
//! * resolve remaining glyph names through the glyph table
//! * substitute the placeholder for anything still unresolved and
//!   collect UTF-8

use super::CharCode;
use super::cmap::CMap;
use super::glyphs::{GlyphTable, TABLE_LINE};
use crate::error::{PdfError, Result};
use crate::tokenizer::Token;
use std::collections::HashMap;
use std::sync::Arc;

/// Placeholder scalar substituted when resolution fails (U+25AF, white
/// vertical rectangle).
pub const UNKNOWN_CHAR: u32 = 0x25AF;

/// Highest code treated as a control character (inclusive).
const CONTROL_MAX: u32 = 30;

const STANDARD_DATA: &str = include_str!("encodings/standard.txt");
const MAC_ROMAN_DATA: &str = include_str!("encodings/mac_roman.txt");
const MAC_EXPERT_DATA: &str = include_str!("encodings/mac_expert.txt");
const PDF_DOC_DATA: &str = include_str!("encodings/pdf_doc.txt");
const SYMBOL_DATA: &str = include_str!("encodings/symbol.txt");
const WIN_ANSI_DATA: &str = include_str!("encodings/win_ansi.txt");
const ZAPF_DINGBATS_DATA: &str = include_str!("encodings/zapf_dingbats.txt");

/// Width of one character code in a raw text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeWidth {
    One,
    Two,
}

/// Static table for a named encoding, or `None` for the identity-style
/// encodings that carry no table of their own. Unknown names are not in
/// the supported set.
fn table_data(name: &str) -> Result<Option<&'static str>> {
    match name {
        "Identity-H" | "UTF16Encoding" => Ok(None),
        "StandardEncoding" => Ok(Some(STANDARD_DATA)),
        "MacRomanEncoding" => Ok(Some(MAC_ROMAN_DATA)),
        "MacExpertEncoding" => Ok(Some(MAC_EXPERT_DATA)),
        "PDFDocEncoding" => Ok(Some(PDF_DOC_DATA)),
        "SymbolEncoding" => Ok(Some(SYMBOL_DATA)),
        "WinAnsiEncoding" => Ok(Some(WIN_ANSI_DATA)),
        "ZapfDingbatsEncoding" => Ok(Some(ZAPF_DINGBATS_DATA)),
        other => Err(PdfError::UnsupportedEncoding(other.to_string())),
    }
}

/// One character-encoding scheme plus its per-font Differences table.
#[derive(Debug)]
pub struct Encoding {
    name: Option<String>,
    width: CodeWidth,
    /// True only for the identity encodings: without an external
    /// ToUnicode map their codes carry no recoverable meaning.
    to_unicode_required: bool,
    mapping: HashMap<u32, u32>,
    differences: HashMap<u32, CharCode>,
    glyphs: Arc<GlyphTable>,
}

/// Resolution tier: `Some` resolves the element outright, `None` defers
/// to the next tier.
type Resolver = fn(&Encoding, &CharCode, Option<&CMap>) -> Option<CharCode>;

/// Tier order is load-bearing: an explicit ToUnicode hit is
/// authoritative, identity-style encodings without one are forced to the
/// placeholder, and the static table and control-range substitution are
/// last-resort heuristics before passthrough.
const RESOLVERS: &[Resolver] = &[
    Encoding::via_to_unicode,
    Encoding::forced_placeholder,
    Encoding::via_static_table,
    Encoding::control_placeholder,
];

impl Encoding {
    /// Create an encoding from its name. `None` selects
    /// StandardEncoding; names outside the known set fail with
    /// [`PdfError::UnsupportedEncoding`].
    pub fn new(name: Option<&str>, glyphs: Arc<GlyphTable>) -> Result<Encoding> {
        let width = match name {
            Some("Identity-H") | Some("UTF16Encoding") => CodeWidth::Two,
            _ => CodeWidth::One,
        };
        let data = match name {
            None => Some(STANDARD_DATA),
            Some(n) => table_data(n)?,
        };

        let mut encoding = Encoding {
            name: name.map(str::to_string),
            width,
            to_unicode_required: name == Some("Identity-H"),
            mapping: HashMap::new(),
            differences: HashMap::new(),
            glyphs,
        };
        if let Some(data) = data {
            encoding.load_table(data);
        }
        Ok(encoding)
    }

    /// Create an encoding from a font-dictionary-like structure carrying
    /// an `Encoding` or `BaseEncoding` name and an optional
    /// `Differences` array.
    pub fn from_dict(dict: &HashMap<String, Token>, glyphs: Arc<GlyphTable>) -> Result<Encoding> {
        let name = match dict.get("Encoding").or_else(|| dict.get("BaseEncoding")) {
            Some(Token::Name(n)) => Some(n.as_str()),
            _ => None,
        };
        let mut encoding = Encoding::new(name, glyphs)?;
        if let Some(diff) = dict.get("Differences") {
            encoding.set_differences(diff)?;
        }
        Ok(encoding)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> CodeWidth {
        self.width
    }

    /// Whether decoding is meaningless without a ToUnicode CMap.
    pub fn to_unicode_required(&self) -> bool {
        self.to_unicode_required
    }

    pub fn has_mapping(&self) -> bool {
        !self.mapping.is_empty()
    }

    /// Load a static table from `/<hex-code>;<4-hex>/` lines; malformed
    /// lines are ignored. Loading onto a populated table is a no-op.
    pub fn load_table(&mut self, data: &str) {
        if self.has_mapping() {
            return;
        }
        for line in data.lines() {
            if let Some(caps) = TABLE_LINE.captures(line)
                && let Ok(code) = u32::from_str_radix(&caps[1], 16)
                && let Ok(unicode) = u32::from_str_radix(&caps[2], 16)
            {
                self.mapping.insert(code, unicode);
            }
        }
    }

    /// Set the Differences table from an alternating array: an integer
    /// element moves the code cursor, any name element assigns at the
    /// cursor and advances it by one.
    ///
    /// Fails with [`PdfError::Format`] if the input is not an array.
    pub fn set_differences(&mut self, diff: &Token) -> Result<()> {
        let Token::Array(items) = diff else {
            return Err(PdfError::Format("Differences must be an array".into()));
        };

        let mut differences = HashMap::new();
        let mut code: u32 = 0;
        for item in items {
            match item {
                Token::Int(n) => code = (*n).max(0) as u32,
                Token::Real(f) => code = f.max(0.0) as u32,
                Token::Name(name) => {
                    differences.insert(code, CharCode::Name(name.clone()));
                    code += 1;
                }
                Token::Str(bytes) => {
                    let name = String::from_utf8_lossy(bytes).into_owned();
                    differences.insert(code, CharCode::Name(name));
                    code += 1;
                }
                _ => {
                    return Err(PdfError::Format(
                        "unexpected entry in Differences array".into(),
                    ));
                }
            }
        }
        self.differences = differences;
        Ok(())
    }

    /// Insert a single override directly (a glyph name or an
    /// already-known scalar) without going through a Differences array.
    pub fn add_difference(&mut self, code: u32, value: CharCode) {
        self.differences.insert(code, value);
    }

    /// Split a raw run into fixed-width big-endian codes. A trailing odd
    /// byte of a two-byte run is dropped.
    fn unpack(&self, bytes: &[u8]) -> Vec<u32> {
        match self.width {
            CodeWidth::One => bytes.iter().map(|&b| b as u32).collect(),
            CodeWidth::Two => bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]) as u32)
                .collect(),
        }
    }

    fn via_to_unicode(&self, element: &CharCode, cmap: Option<&CMap>) -> Option<CharCode> {
        let cmap = cmap?;
        match element {
            // Names pass through the map as already-resolved values,
            // which counts as a hit.
            CharCode::Name(_) => Some(element.clone()),
            CharCode::Code(code) => cmap.get(*code).map(CharCode::Code),
        }
    }

    fn forced_placeholder(&self, _element: &CharCode, cmap: Option<&CMap>) -> Option<CharCode> {
        (cmap.is_some() || self.to_unicode_required).then_some(CharCode::Code(UNKNOWN_CHAR))
    }

    fn via_static_table(&self, element: &CharCode, _cmap: Option<&CMap>) -> Option<CharCode> {
        match element {
            CharCode::Code(code) => self.mapping.get(code).copied().map(CharCode::Code),
            CharCode::Name(_) => None,
        }
    }

    fn control_placeholder(&self, element: &CharCode, _cmap: Option<&CMap>) -> Option<CharCode> {
        matches!(element, CharCode::Code(code) if *code <= CONTROL_MAX)
            .then_some(CharCode::Code(UNKNOWN_CHAR))
    }

    /// Run one element through the tier cascade. The fallthrough is
    /// passthrough: the code is assumed to already be a Unicode scalar.
    fn resolve(&self, element: CharCode, cmap: Option<&CMap>) -> CharCode {
        for tier in RESOLVERS {
            if let Some(resolved) = tier(self, &element, cmap) {
                return resolved;
            }
        }
        element
    }

    /// Decode one raw show-text operand to UTF-8 text.
    pub fn to_utf8(&self, bytes: &[u8], to_unicode: Option<&CMap>) -> String {
        let mut out = String::with_capacity(bytes.len());
        for code in self.unpack(bytes) {
            let element = match self.differences.get(&code) {
                Some(replacement) => replacement.clone(),
                None => CharCode::Code(code),
            };
            let scalar = match self.resolve(element, to_unicode) {
                CharCode::Code(scalar) => scalar,
                CharCode::Name(name) => self.glyphs.get(&name).unwrap_or(UNKNOWN_CHAR),
            };
            // Surrogates and out-of-range values cannot become chars;
            // they get the placeholder like any other failed resolution.
            out.push(char::from_u32(scalar).unwrap_or('\u{25AF}'));
        }
        out
    }
}
