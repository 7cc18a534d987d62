//! dumptext - inspect ToUnicode CMaps and decode raw text runs.
//!
//! Companion tool for debugging encoding problems: dump the mapping a
//! CMap program produces, or run a hex-encoded show-text operand through
//! a named encoding with optional Differences overrides and a CMap.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdftext_core::{CMap, CharCode, Encoding, GlyphTable};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dumptext")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a CMap program and dump its source-to-destination mapping
    Cmap {
        /// Path to the CMap program text
        file: PathBuf,
    },
    /// Decode a hex-encoded text run through an encoding
    Decode {
        /// The raw run as hex digits (e.g. 48656c6c6f)
        hex: String,

        /// Encoding name
        #[arg(short, long, default_value = "StandardEncoding")]
        encoding: String,

        /// Differences overrides as code=glyphname pairs (e.g. 5=space)
        #[arg(short, long = "diff")]
        diffs: Vec<String>,

        /// Optional ToUnicode CMap program to consult first
        #[arg(short, long)]
        cmap: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Cmap { file } => {
            let data = fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let cmap = CMap::parse(&data).context("failed to parse CMap program")?;

            let mut entries: Vec<(u32, u32)> = cmap.iter().collect();
            entries.sort_unstable();
            for (src, dst) in entries {
                writeln!(out, "<{src:04x}> -> <{dst:04x}>")?;
            }
            writeln!(out, "{} mappings", cmap.size())?;
        }
        Command::Decode {
            hex,
            encoding,
            diffs,
            cmap,
        } => {
            let bytes = parse_hex(&hex)?;
            let mut enc = Encoding::new(Some(&encoding), GlyphTable::shared())
                .with_context(|| format!("cannot construct encoding {encoding}"))?;
            for diff in &diffs {
                let Some((code, name)) = diff.split_once('=') else {
                    bail!("malformed differences override: {diff} (expected code=name)");
                };
                let code: u32 = code
                    .parse()
                    .with_context(|| format!("bad code in override {diff}"))?;
                enc.add_difference(code, CharCode::Name(name.to_string()));
            }
            let to_unicode = match cmap {
                Some(path) => {
                    let data = fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    Some(CMap::parse(&data).context("failed to parse CMap program")?)
                }
                None => None,
            };

            writeln!(out, "{}", enc.to_utf8(&bytes, to_unicode.as_ref()))?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Decode a run given as hex digits; whitespace is allowed.
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hex = std::str::from_utf8(pair).context("invalid hex input")?;
            u8::from_str_radix(hex, 16).with_context(|| format!("invalid hex byte {hex}"))
        })
        .collect()
}
