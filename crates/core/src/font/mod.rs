//! Text-run decoding: CMaps, encodings, glyph tables and the Font front end.

pub mod cmap;
pub mod encoding;
pub mod font;
pub mod glyphs;

pub use cmap::CMap;
pub use encoding::{CodeWidth, Encoding, UNKNOWN_CHAR};
pub use font::{DecodedItem, Font, TextItem};
pub use glyphs::GlyphTable;

/// One element of a partially decoded text run.
///
/// Codes start out as raw source codes, become Unicode scalars as the
/// pipeline resolves them, and may pass through a glyph-name stage in
/// between (a Differences override, or a value carried unchanged through
/// a ToUnicode CMap). The variant is decided once where the element is
/// produced; consumers match instead of re-inspecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharCode {
    /// A numeric code: source code or already-resolved Unicode scalar.
    Code(u32),
    /// A glyph name awaiting resolution against the glyph table.
    Name(String),
}
