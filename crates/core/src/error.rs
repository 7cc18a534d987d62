//! Error types for the pdftext decoding library.

use thiserror::Error;

/// Primary error type for text-run decoding operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("invalid token at position {pos}: {msg}")]
    Token { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("format error: {0}")]
    Format(String),

    #[error("{0} is not a supported encoding")]
    UnsupportedEncoding(String),

    #[error("font encoding {0} was never resolved to an Encoding")]
    UnsupportedFontEncoding(String),

    #[error("no mapping for code {0:#06x}")]
    CMapLookup(u32),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
