//! TrueType parsing for the atlas pipeline
//!
//! Decodes the subset of TTF a metrics-driven SDF text renderer needs:
//! the table directory (with checksum verification), `head`, `cmap`
//! (Format 4), `maxp`, `hhea`/`hmtx`, `loca`/`glyf` headers, and the
//! kerning slice of `GPOS`. Parsing is all-or-nothing — any structural
//! problem aborts the load, and no partially parsed font escapes.
//!
//! ```no_run
//! use typeatlas_ttf::{parse_ttf, ParseSettings};
//!
//! let data = std::fs::read("font.ttf")?;
//! let font = parse_ttf(&data, &ParseSettings::default())?;
//! println!("{} glyphs, {} units/em", font.maxp.num_glyphs, font.head.units_per_em);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;

use typeatlas_core::{Diagnostic, FontError, Result};

pub mod gpos;
pub mod quads;
pub mod reader;
pub mod tables;

pub use gpos::GposTable;
pub use quads::{glyph_quads, Glyph};
pub use reader::FontReader;
pub use tables::{
    table_checksum, CmapTable, GlyphHeader, HeadTable, HheaTable, HmtxTable, LocaTable,
    MaxpTable, TableRecord,
};

/// Knobs for the parse itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseSettings {
    /// Echo skipped-feature diagnostics through `log::warn!`.
    pub debug: bool,
}

/// A fully parsed font. Immutable once built; wrap it in an `Arc` to share
/// across shaping calls.
#[derive(Debug, Clone)]
pub struct TtfFont {
    pub tables: HashMap<[u8; 4], TableRecord>,
    pub head: HeadTable,
    pub cmap: CmapTable,
    pub maxp: MaxpTable,
    pub hhea: HheaTable,
    pub hmtx: HmtxTable,
    pub loca: LocaTable,
    pub glyf: Vec<GlyphHeader>,
    pub gpos: Option<GposTable>,
    /// Optional GPOS features the parser skipped, in encounter order.
    pub diagnostics: Vec<Diagnostic>,
}

impl TtfFont {
    /// Glyph index for a character, if the font maps it to a real glyph.
    pub fn glyph_index(&self, ch: char) -> Option<u16> {
        self.cmap
            .glyph_index_map
            .get(&(ch as u32))
            .copied()
            .filter(|&index| index != 0)
    }
}

const MAX_TABLES: u16 = 20;

const REQUIRED_TABLES: [[u8; 4]; 7] = [
    *b"head", *b"cmap", *b"maxp", *b"hhea", *b"hmtx", *b"loca", *b"glyf",
];

/// Parse a TTF byte buffer.
pub fn parse_ttf(data: &[u8], settings: &ParseSettings) -> Result<TtfFont> {
    if data.is_empty() {
        return Err(FontError::UnsupportedFormat("file is empty".into()));
    }

    let mut reader = FontReader::new(data);

    let _scaler_type = reader.read_u32()?;
    let num_tables = reader.read_u16()?;
    let _search_range = reader.read_u16()?;
    let _entry_selector = reader.read_u16()?;
    let _range_shift = reader.read_u16()?;

    if num_tables > MAX_TABLES {
        return Err(FontError::UnsupportedFormat(format!(
            "{num_tables} tables is more than a TTF plausibly has"
        )));
    }

    let mut tables = HashMap::with_capacity(num_tables as usize);
    for _ in 0..num_tables {
        let tag = reader.read_tag()?;
        let record = TableRecord {
            checksum: reader.read_u32()?,
            offset: reader.read_u32()?,
            length: reader.read_u32()?,
        };

        // `head` is excluded: its checksumAdjustment field makes the stored
        // value unverifiable without zeroing it first.
        if &tag != b"head" {
            verify_checksum(&reader, tag, record)?;
        }

        tables.insert(tag, record);
    }

    for tag in REQUIRED_TABLES {
        if !tables.contains_key(&tag) {
            return Err(FontError::CorruptFont(format!(
                "{} table is missing; use a font variant that contains it",
                tag_name(tag)
            )));
        }
    }

    let head = tables::read_head(&mut reader, tables[b"head"].offset as usize)?;
    let cmap = tables::read_cmap(&mut reader, tables[b"cmap"].offset as usize)?;
    let maxp = tables::read_maxp(&mut reader, tables[b"maxp"].offset as usize)?;
    let hhea = tables::read_hhea(&mut reader, tables[b"hhea"].offset as usize)?;
    let hmtx = tables::read_hmtx(
        &mut reader,
        tables[b"hmtx"].offset as usize,
        maxp.num_glyphs,
        hhea.number_of_h_metrics,
    )?;
    let loca = tables::read_loca(
        &mut reader,
        tables[b"loca"].offset as usize,
        maxp.num_glyphs,
        head.index_to_loc_format,
    )?;
    let glyf = tables::read_glyf(
        &mut reader,
        tables[b"glyf"].offset as usize,
        &loca,
        head.index_to_loc_format,
    )?;

    let mut diagnostics = Vec::new();
    let gpos = match tables.get(b"GPOS") {
        Some(record) => Some(gpos::read_gpos(
            &mut reader,
            record.offset as usize,
            &mut diagnostics,
            settings.debug,
        )?),
        None => None,
    };

    log::debug!(
        "parsed font: {} glyphs, {} units/em, {} cmap entries, kerning: {}",
        maxp.num_glyphs,
        head.units_per_em,
        cmap.glyph_index_map.len(),
        gpos.is_some()
    );

    Ok(TtfFont {
        tables,
        head,
        cmap,
        maxp,
        hhea,
        hmtx,
        loca,
        glyf,
        gpos,
        diagnostics,
    })
}

fn verify_checksum(reader: &FontReader<'_>, tag: [u8; 4], record: TableRecord) -> Result<()> {
    let padded_length = record.length.div_ceil(4) * 4;
    // Tables at the very end of the file may be stored without their pad
    // bytes; checksum over what exists and let the zero padding be implicit.
    let available = (reader.len() - (record.offset as usize).min(reader.len()))
        .min(padded_length as usize);
    let bytes = reader.slice(record.offset as usize, available)?;
    let calculated = tables::table_checksum(bytes);

    if calculated != record.checksum {
        return Err(FontError::CorruptFont(format!(
            "checksum for table {} is invalid (stored {:#010x}, calculated {calculated:#010x})",
            tag_name(tag),
            record.checksum
        )));
    }
    Ok(())
}

fn tag_name(tag: [u8; 4]) -> String {
    tag.iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
        .collect()
}
