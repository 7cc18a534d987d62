//! Font front end: routes show-text operands through the right encoding.
//!
//! A Font owns at most one [`Encoding`] and at most one ToUnicode
//! [`CMap`]; both are consulted during decoding, with the CMap taking
//! priority when present. Which font applies to which text run is
//! decided elsewhere.

use super::cmap::CMap;
use super::encoding::Encoding;
use super::glyphs::GlyphTable;
use crate::error::{PdfError, Result};
use std::sync::{Arc, LazyLock};

/// Fallback for fonts that declare no encoding at all: text is assumed
/// to be in Adobe Standard Encoding. Built once and shared.
static STANDARD_FALLBACK: LazyLock<Encoding> = LazyLock::new(|| {
    Encoding::new(Some("StandardEncoding"), GlyphTable::shared())
        .expect("StandardEncoding is in the supported set")
});

/// A show-text operand: a raw byte run, a kerning offset, or a nested
/// sequence of both (the TJ operator form).
#[derive(Debug, Clone, PartialEq)]
pub enum TextItem {
    Bytes(Vec<u8>),
    Number(f64),
    Array(Vec<TextItem>),
}

/// Decoded counterpart of [`TextItem`]: byte runs become text, numbers
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedItem {
    Text(String),
    Number(f64),
    Array(Vec<DecodedItem>),
}

/// Encoding state of a font.
#[derive(Debug)]
enum FontEncoding {
    /// No encoding declared; the standard fallback applies.
    None,
    /// A bare name that was never resolved into an [`Encoding`].
    /// Decoding through it is a caller defect.
    Named(String),
    Resolved(Encoding),
}

#[derive(Debug)]
pub struct Font {
    basefont: Option<String>,
    encoding: FontEncoding,
    to_unicode: Option<CMap>,
}

impl Font {
    /// Create a font. The Symbol and ZapfDingbats base fonts imply their
    /// own encodings; anything else starts with none.
    pub fn new(basefont: Option<&str>, glyphs: Arc<GlyphTable>) -> Result<Font> {
        let encoding = match basefont {
            Some("Symbol") => {
                FontEncoding::Resolved(Encoding::new(Some("SymbolEncoding"), glyphs)?)
            }
            Some("ZapfDingbats") => {
                FontEncoding::Resolved(Encoding::new(Some("ZapfDingbatsEncoding"), glyphs)?)
            }
            _ => FontEncoding::None,
        };
        Ok(Font {
            basefont: basefont.map(str::to_string),
            encoding,
            to_unicode: None,
        })
    }

    pub fn basefont(&self) -> Option<&str> {
        self.basefont.as_deref()
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = FontEncoding::Resolved(encoding);
    }

    /// Record an encoding name that was never turned into an
    /// [`Encoding`]. Kept so the defect surfaces at decode time.
    pub fn set_encoding_name(&mut self, name: impl Into<String>) {
        self.encoding = FontEncoding::Named(name.into());
    }

    pub fn set_to_unicode(&mut self, cmap: CMap) {
        self.to_unicode = Some(cmap);
    }

    pub fn to_unicode(&self) -> Option<&CMap> {
        self.to_unicode.as_ref()
    }

    /// Decode a show-text operand. Sequences are mapped element-wise,
    /// recursively; kerning numbers pass through unchanged.
    pub fn to_utf8(&self, item: &TextItem) -> Result<DecodedItem> {
        if let FontEncoding::Named(name) = &self.encoding {
            return Err(PdfError::UnsupportedFontEncoding(name.clone()));
        }
        match item {
            TextItem::Bytes(bytes) => {
                let encoding = match &self.encoding {
                    FontEncoding::Resolved(encoding) => encoding,
                    _ => &*STANDARD_FALLBACK,
                };
                Ok(DecodedItem::Text(
                    encoding.to_utf8(bytes, self.to_unicode.as_ref()),
                ))
            }
            TextItem::Array(items) => items
                .iter()
                .map(|item| self.to_utf8(item))
                .collect::<Result<Vec<_>>>()
                .map(DecodedItem::Array),
            TextItem::Number(n) => Ok(DecodedItem::Number(*n)),
        }
    }
}
