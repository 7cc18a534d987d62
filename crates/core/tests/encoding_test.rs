//! Tests for the Encoding decode pipeline.

use pdftext_core::font::{CharCode, CodeWidth};
use pdftext_core::tokenizer::Token;
use pdftext_core::{CMap, Encoding, GlyphTable, PdfError};
use std::collections::HashMap;

const PLACEHOLDER: &str = "\u{25AF}";

fn standard() -> Encoding {
    Encoding::new(Some("StandardEncoding"), GlyphTable::shared()).unwrap()
}

// === construction tests ===

#[test]
fn test_unknown_encoding_rejected() {
    let err = Encoding::new(Some("KlingonEncoding"), GlyphTable::shared()).unwrap_err();
    assert!(matches!(err, PdfError::UnsupportedEncoding(name) if name == "KlingonEncoding"));
}

#[test]
fn test_no_name_selects_standard() {
    let encoding = Encoding::new(None, GlyphTable::shared()).unwrap();
    assert!(encoding.has_mapping());
    assert_eq!(encoding.width(), CodeWidth::One);
    assert_eq!(encoding.to_utf8(&[0x41], None), "A");
}

#[test]
fn test_identity_h_width_and_requirement() {
    let encoding = Encoding::new(Some("Identity-H"), GlyphTable::shared()).unwrap();
    assert_eq!(encoding.width(), CodeWidth::Two);
    assert!(encoding.to_unicode_required());
}

#[test]
fn test_from_dict_with_base_encoding() {
    let mut dict = HashMap::new();
    dict.insert(
        "BaseEncoding".to_string(),
        Token::Name("WinAnsiEncoding".to_string()),
    );
    let encoding = Encoding::from_dict(&dict, GlyphTable::shared()).unwrap();
    assert_eq!(encoding.name(), Some("WinAnsiEncoding"));
    assert_eq!(encoding.to_utf8(&[0xE9], None), "\u{00E9}");
}

#[test]
fn test_from_dict_with_differences() {
    let mut dict = HashMap::new();
    dict.insert(
        "Encoding".to_string(),
        Token::Name("StandardEncoding".to_string()),
    );
    dict.insert(
        "Differences".to_string(),
        Token::Array(vec![Token::Int(0x41), Token::Name("bullet".to_string())]),
    );
    let encoding = Encoding::from_dict(&dict, GlyphTable::shared()).unwrap();
    assert_eq!(encoding.to_utf8(&[0x41, 0x42], None), "\u{2022}B");
}

// === static table tests ===

#[test]
fn test_static_table_lookup() {
    assert_eq!(standard().to_utf8(&[0x41], None), "A");
    assert_eq!(standard().to_utf8(&[0x48, 0x69], None), "Hi");
}

#[test]
fn test_symbol_table_lookup() {
    let encoding = Encoding::new(Some("SymbolEncoding"), GlyphTable::shared()).unwrap();
    assert_eq!(encoding.to_utf8(&[0x61], None), "\u{03B1}");
}

#[test]
fn test_reload_is_noop() {
    let mut encoding = standard();
    let before = encoding.to_utf8(&[0x41, 0x42, 0x43], None);
    // A second load, even of a conflicting table, must change nothing
    encoding.load_table("/41;2603/\n");
    assert_eq!(encoding.to_utf8(&[0x41, 0x42, 0x43], None), before);
}

// === pipeline tier tests ===

#[test]
fn test_cmap_wins_over_static_table() {
    let cmap = CMap::parse(b"1 beginbfchar\n<41> <0042>\nendbfchar\n").unwrap();
    assert_eq!(standard().to_utf8(&[0x41], Some(&cmap)), "B");
}

#[test]
fn test_cmap_miss_forces_placeholder() {
    // The static table knows 0x41, but a supplied CMap that misses
    // forecloses every later tier
    let cmap = CMap::parse(b"1 beginbfchar\n<01> <0042>\nendbfchar\n").unwrap();
    assert_eq!(standard().to_utf8(&[0x41], Some(&cmap)), PLACEHOLDER);
}

#[test]
fn test_identity_without_cmap_is_all_placeholders() {
    let encoding = Encoding::new(Some("Identity-H"), GlyphTable::shared()).unwrap();
    let text = encoding.to_utf8(&[0x00, 0x41, 0x00, 0x42], None);
    assert_eq!(text, format!("{PLACEHOLDER}{PLACEHOLDER}"));
}

#[test]
fn test_identity_with_cmap_resolves() {
    let encoding = Encoding::new(Some("Identity-H"), GlyphTable::shared()).unwrap();
    let cmap = CMap::parse(b"1 beginbfchar\n<0041> <0061>\nendbfchar\n").unwrap();
    assert_eq!(encoding.to_utf8(&[0x00, 0x41], Some(&cmap)), "a");
}

#[test]
fn test_utf16_without_cmap_passes_codes_through() {
    // UTF16Encoding is two-byte but not identity: no table, no forced
    // placeholder, so codes fall through as Unicode scalars
    let encoding = Encoding::new(Some("UTF16Encoding"), GlyphTable::shared()).unwrap();
    assert_eq!(encoding.to_utf8(&[0x00, 0x41, 0x30, 0x42], None), "A\u{3042}");
}

#[test]
fn test_control_code_becomes_placeholder() {
    assert_eq!(standard().to_utf8(&[0x0A], None), PLACEHOLDER);
    assert_eq!(standard().to_utf8(&[0x00], None), PLACEHOLDER);
    assert_eq!(standard().to_utf8(&[30], None), PLACEHOLDER);
}

#[test]
fn test_unmapped_code_passes_through() {
    // 0x2022 is no-one's single-byte code; feed it via a two-byte encoding
    let encoding = Encoding::new(Some("UTF16Encoding"), GlyphTable::shared()).unwrap();
    assert_eq!(encoding.to_utf8(&[0x20, 0x22], None), "\u{2022}");
}

#[test]
fn test_odd_trailing_byte_dropped_for_two_byte_codes() {
    let encoding = Encoding::new(Some("UTF16Encoding"), GlyphTable::shared()).unwrap();
    assert_eq!(encoding.to_utf8(&[0x00, 0x41, 0x00], None), "A");
}

// === differences tests ===

#[test]
fn test_differences_glyph_name_resolution() {
    let mut encoding = standard();
    encoding
        .set_differences(&Token::Array(vec![
            Token::Int(5),
            Token::Name("space".to_string()),
        ]))
        .unwrap();
    assert_eq!(encoding.to_utf8(&[0x05], None), " ");
}

#[test]
fn test_differences_unknown_name_becomes_placeholder() {
    let mut encoding = standard();
    encoding
        .set_differences(&Token::Array(vec![
            Token::Int(5),
            Token::Name("notarealglyph".to_string()),
        ]))
        .unwrap();
    assert_eq!(encoding.to_utf8(&[0x05], None), PLACEHOLDER);
}

#[test]
fn test_differences_cursor_advances() {
    // [65 /a /b] maps 65 -> a and 66 -> b
    let mut encoding = standard();
    encoding
        .set_differences(&Token::Array(vec![
            Token::Int(65),
            Token::Name("a".to_string()),
            Token::Name("b".to_string()),
        ]))
        .unwrap();
    assert_eq!(encoding.to_utf8(&[65, 66, 67], None), "abC");
}

#[test]
fn test_differences_not_array_fails() {
    let mut encoding = standard();
    let err = encoding.set_differences(&Token::Int(5)).unwrap_err();
    assert!(matches!(err, PdfError::Format(_)));
}

#[test]
fn test_differences_scalar_override() {
    let mut encoding = standard();
    encoding.add_difference(0x41, CharCode::Code(0x2603));
    assert_eq!(encoding.to_utf8(&[0x41], None), "\u{2603}");
}

#[test]
fn test_differences_name_survives_cmap_tier() {
    // A glyph name carried through a supplied CMap still resolves via
    // the glyph table instead of the forced placeholder
    let mut encoding = standard();
    encoding.add_difference(0x05, CharCode::Name("space".to_string()));
    let cmap = CMap::parse(b"").unwrap();
    assert_eq!(encoding.to_utf8(&[0x05], Some(&cmap)), " ");
}

// === reuse tests ===

#[test]
fn test_encoding_reusable_across_runs() {
    let encoding = standard();
    assert_eq!(encoding.to_utf8(&[0x41], None), "A");
    let cmap = CMap::parse(b"1 beginbfchar\n<41> <005A>\nendbfchar\n").unwrap();
    assert_eq!(encoding.to_utf8(&[0x41], Some(&cmap)), "Z");
    // Supplying a CMap for one run leaves later plain runs untouched
    assert_eq!(encoding.to_utf8(&[0x41], None), "A");
}
