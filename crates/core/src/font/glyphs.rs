//! Glyph-name to Unicode table.
//!
//! Built once per process from the embedded Adobe glyph list and shared
//! read-only by every [`Encoding`](super::Encoding). Callers thread the
//! handle explicitly; nothing here mutates after construction.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Adobe glyph list data embedded at compile time.
const GLYPHLIST_DATA: &str = include_str!("glyphlist.txt");

/// Line format shared by the glyph list and the per-encoding tables:
/// `/<identifier>;<4-hex-digit codepoint>/`. Non-matching lines are
/// ignored by every consumer.
pub(crate) static TABLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([0-9A-Za-z]+);([0-9A-F]{4})/").expect("table line regex")
});

static SHARED: LazyLock<Arc<GlyphTable>> =
    LazyLock::new(|| Arc::new(GlyphTable::parse(GLYPHLIST_DATA)));

/// Mapping from glyph name to Unicode scalar.
#[derive(Debug)]
pub struct GlyphTable {
    map: HashMap<String, u32>,
}

impl GlyphTable {
    /// Build a table from `/<name>;<4-hex>/` lines; malformed lines are
    /// ignored.
    pub fn parse(data: &str) -> Self {
        let mut map = HashMap::with_capacity(300);
        for line in data.lines() {
            if let Some(caps) = TABLE_LINE.captures(line)
                && let Ok(code) = u32::from_str_radix(&caps[2], 16)
            {
                map.insert(caps[1].to_string(), code);
            }
        }
        Self { map }
    }

    /// The process-wide table over the embedded glyph list, built at most
    /// once. The `Arc` handle is what gets threaded into Encodings.
    pub fn shared() -> Arc<GlyphTable> {
        Arc::clone(&SHARED)
    }

    /// Look up a glyph name.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
