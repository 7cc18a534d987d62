//! pdftext - decoding of PDF content-stream text runs into Unicode.

pub mod error;
pub mod font;
pub mod tokenizer;

pub use error::{PdfError, Result};
pub use font::{CMap, CharCode, Encoding, Font, GlyphTable};
