//! Hand-assembled TrueType fixtures for tests
//!
//! Real font files are too big and too licensed to check in, and they make
//! failures hard to reason about. This crate builds tiny, structurally valid
//! TTF buffers from a declarative spec: a handful of glyphs, simple metrics,
//! a Format-4 cmap with one segment per character, short `loca` offsets, and
//! optionally a GPOS table carrying explicit pair kerning under the `kern`
//! feature (Extension Positioning wrapping Pair Adjustment posFormat 1).
//!
//! Directory checksums are computed for every table, so the fixtures pass
//! the same verification real fonts do — and corrupting any byte of a
//! non-`head` table makes them fail it, which is exactly what the checksum
//! tests want.

/// One glyph to include in the font. Glyph indices are assigned in order,
/// starting at 1 (index 0 is the empty `.notdef`).
#[derive(Debug, Clone, Copy)]
pub struct GlyphSpec {
    pub ch: char,
    pub advance: u16,
    pub lsb: i16,
    /// Design-space bounding box: (x_min, y_min, x_max, y_max).
    pub bbox: (i16, i16, i16, i16),
}

/// Declarative description of a fixture font.
#[derive(Debug, Clone)]
pub struct FontSpec {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub glyphs: Vec<GlyphSpec>,
    /// Explicit pair kerning `(first, second, x_advance)`. Non-empty input
    /// produces a GPOS table.
    pub kerning: Vec<(char, char, i16)>,
    /// Override `hhea.numberOfHMetrics` to exercise the trailing
    /// left-side-bearing array. Must be between 1 and `glyphs.len() + 1`.
    pub number_of_h_metrics: Option<u16>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            glyphs: Vec::new(),
            kerning: Vec::new(),
            number_of_h_metrics: None,
        }
    }
}

/// A built fixture: the raw bytes plus the table directory for tests that
/// want to poke at specific table ranges.
#[derive(Debug, Clone)]
pub struct BuiltFont {
    pub data: Vec<u8>,
    /// `(tag, offset, length)` per table, in file order.
    pub tables: Vec<([u8; 4], u32, u32)>,
}

impl BuiltFont {
    /// Byte range of a table within `data`.
    pub fn table_range(&self, tag: &[u8; 4]) -> Option<(usize, usize)> {
        self.tables
            .iter()
            .find(|(t, _, _)| t == tag)
            .map(|&(_, offset, length)| (offset as usize, (offset + length) as usize))
    }
}

/// The single-glyph font most tests start from: 'A' with
/// `unitsPerEm = 1000`, `advanceWidth = 600`, `lsb = 50`.
pub fn minimal_font() -> BuiltFont {
    FontSpec {
        glyphs: vec![GlyphSpec {
            ch: 'A',
            advance: 600,
            lsb: 50,
            bbox: (50, 0, 550, 700),
        }],
        ..FontSpec::default()
    }
    .build()
}

/// A–Z with uniform metrics, handy for cmap and packing tests.
pub fn alphabet_font() -> BuiltFont {
    FontSpec {
        glyphs: ('A'..='Z')
            .map(|ch| GlyphSpec {
                ch,
                advance: 600,
                lsb: 50,
                bbox: (50, 0, 550, 700),
            })
            .collect(),
        ..FontSpec::default()
    }
    .build()
}

impl FontSpec {
    pub fn build(&self) -> BuiltFont {
        let num_glyphs = self.glyphs.len() as u16 + 1; // + .notdef
        let number_of_h_metrics = self.number_of_h_metrics.unwrap_or(num_glyphs);
        assert!(
            (1..=num_glyphs).contains(&number_of_h_metrics),
            "numberOfHMetrics out of range"
        );

        let head = self.build_head();
        let cmap = self.build_cmap();
        let maxp = build_maxp(num_glyphs);
        let hhea = self.build_hhea(number_of_h_metrics);
        let hmtx = self.build_hmtx(number_of_h_metrics);
        let (loca, glyf) = self.build_loca_glyf();

        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"head", head),
            (*b"cmap", cmap),
            (*b"maxp", maxp),
            (*b"hhea", hhea),
            (*b"hmtx", hmtx),
            (*b"loca", loca),
            (*b"glyf", glyf),
        ];
        if !self.kerning.is_empty() {
            tables.push((*b"GPOS", self.build_gpos()));
        }

        assemble(tables)
    }

    fn build_head(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.u16(1); // majorVersion
        w.u16(0); // minorVersion
        w.u32(0x0001_0000); // fontRevision 1.0
        w.u32(0); // checksumAdjustment
        w.u32(0x5F0F_3CF5); // magicNumber
        w.u16(0); // flags
        w.u16(self.units_per_em);
        w.i64(0); // created
        w.i64(0); // modified
        let (x_min, y_min, x_max, y_max) = self.font_bbox();
        w.i16(x_min);
        w.i16(y_min);
        w.i16(x_max);
        w.i16(y_max);
        w.u16(0); // macStyle
        w.u16(8); // lowestRecPPEM
        w.i16(2); // fontDirectionHint
        w.i16(0); // indexToLocFormat: short
        w.i16(0); // glyphDataFormat
        w.bytes
    }

    fn font_bbox(&self) -> (i16, i16, i16, i16) {
        let mut bbox = (0i16, 0i16, 0i16, 0i16);
        for glyph in &self.glyphs {
            bbox.0 = bbox.0.min(glyph.bbox.0);
            bbox.1 = bbox.1.min(glyph.bbox.1);
            bbox.2 = bbox.2.max(glyph.bbox.2);
            bbox.3 = bbox.3.max(glyph.bbox.3);
        }
        bbox
    }

    /// Format 4, one segment per character plus the 0xFFFF sentinel.
    fn build_cmap(&self) -> Vec<u8> {
        let mut mapped: Vec<(u16, u16)> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(i, glyph)| (glyph.ch as u16, i as u16 + 1))
            .collect();
        mapped.sort_unstable();

        let seg_count = mapped.len() as u16 + 1;
        let subtable_len = 16 + 8 * seg_count as usize;

        let mut w = Writer::new();
        w.u16(0); // version
        w.u16(1); // numTables
        w.u16(3); // platformID: Windows
        w.u16(1); // encodingID: Unicode BMP
        w.u32(12); // subtable offset

        // Format 4 subtable
        w.u16(4);
        w.u16(subtable_len as u16);
        w.u16(0); // language
        w.u16(seg_count * 2);
        let search_range = 2 * 2u16.pow((seg_count as f32).log2().floor() as u32);
        w.u16(search_range);
        w.u16((seg_count as f32).log2().floor() as u16);
        w.u16(seg_count * 2 - search_range);

        for &(code, _) in &mapped {
            w.u16(code); // endCode
        }
        w.u16(0xFFFF);
        w.u16(0); // reservedPad
        for &(code, _) in &mapped {
            w.u16(code); // startCode
        }
        w.u16(0xFFFF);
        for &(code, glyph_index) in &mapped {
            w.u16(glyph_index.wrapping_sub(code)); // idDelta
        }
        w.u16(1); // sentinel idDelta
        for _ in 0..seg_count {
            w.u16(0); // idRangeOffset
        }
        w.bytes
    }

    fn build_hhea(&self, number_of_h_metrics: u16) -> Vec<u8> {
        let advance_width_max = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let mut w = Writer::new();
        w.u16(1); // majorVersion
        w.u16(0); // minorVersion
        w.i16(self.ascender);
        w.i16(self.descender);
        w.i16(0); // lineGap
        w.u16(advance_width_max);
        w.i16(0); // minLeftSideBearing
        w.i16(0); // minRightSideBearing
        w.i16(advance_width_max as i16); // xMaxExtent
        w.i16(1); // caretSlopeRise
        w.i16(0); // caretSlopeRun
        w.i16(0); // caretOffset
        for _ in 0..4 {
            w.i16(0); // reserved
        }
        w.i16(0); // metricDataFormat
        w.u16(number_of_h_metrics);
        w.bytes
    }

    fn build_hmtx(&self, number_of_h_metrics: u16) -> Vec<u8> {
        // Glyph order: .notdef, then self.glyphs.
        let metrics: Vec<(u16, i16)> = std::iter::once((500, 0))
            .chain(self.glyphs.iter().map(|g| (g.advance, g.lsb)))
            .collect();

        let mut w = Writer::new();
        for &(advance, lsb) in &metrics[..number_of_h_metrics as usize] {
            w.u16(advance);
            w.i16(lsb);
        }
        for &(_, lsb) in &metrics[number_of_h_metrics as usize..] {
            w.i16(lsb);
        }
        w.bytes
    }

    /// Header-only glyph records, 12 bytes each so short `loca` offsets stay
    /// even. `.notdef` and glyphs with an all-zero bbox (space) are empty:
    /// equal consecutive `loca` offsets, no `glyf` bytes.
    fn build_loca_glyf(&self) -> (Vec<u8>, Vec<u8>) {
        const GLYPH_RECORD: usize = 12;

        let mut glyf = Writer::new();
        let mut loca = Writer::new();
        loca.u16(0); // .notdef start
        loca.u16(0); // .notdef end == start: empty glyph

        let mut running = 0usize;
        for glyph in &self.glyphs {
            if glyph.bbox != (0, 0, 0, 0) {
                glyf.i16(1); // numberOfContours
                glyf.i16(glyph.bbox.0);
                glyf.i16(glyph.bbox.1);
                glyf.i16(glyph.bbox.2);
                glyf.i16(glyph.bbox.3);
                glyf.u16(0); // padding to GLYPH_RECORD bytes
                running += GLYPH_RECORD;
            }
            loca.u16((running / 2) as u16);
        }

        (loca.bytes, glyf.bytes)
    }

    /// GPOS with one `kern` feature pointing at one Extension Positioning
    /// lookup wrapping a Pair Adjustment posFormat 1 subtable. Coverage is
    /// format 2 with one single-glyph range per first glyph.
    fn build_gpos(&self) -> Vec<u8> {
        let glyph_index = |ch: char| -> u16 {
            self.glyphs
                .iter()
                .position(|g| g.ch == ch)
                .map(|i| i as u16 + 1)
                .unwrap_or_else(|| panic!("kerning references unknown glyph {ch:?}"))
        };

        // first glyph id -> [(second glyph id, x_advance)]
        let mut by_first: Vec<(u16, Vec<(u16, i16)>)> = Vec::new();
        for &(first, second, value) in &self.kerning {
            let first_id = glyph_index(first);
            let second_id = glyph_index(second);
            match by_first.iter_mut().find(|(id, _)| *id == first_id) {
                Some((_, pairs)) => pairs.push((second_id, value)),
                None => by_first.push((first_id, vec![(second_id, value)])),
            }
        }
        by_first.sort_unstable_by_key(|(id, _)| *id);

        // Pair Adjustment subtable, offsets relative to its own start.
        let pair_set_count = by_first.len();
        let pair_sets_start = 10 + 2 * pair_set_count;
        let mut pair_set_offsets = Vec::with_capacity(pair_set_count);
        let mut running = pair_sets_start;
        for (_, pairs) in &by_first {
            pair_set_offsets.push(running as u16);
            running += 2 + pairs.len() * 4;
        }
        let coverage_offset = running;

        let mut pair_pos = Writer::new();
        pair_pos.u16(1); // posFormat
        pair_pos.u16(coverage_offset as u16);
        pair_pos.u16(0x0004); // valueFormat1: xAdvance
        pair_pos.u16(0); // valueFormat2
        pair_pos.u16(pair_set_count as u16);
        for offset in &pair_set_offsets {
            pair_pos.u16(*offset);
        }
        for (_, pairs) in &by_first {
            pair_pos.u16(pairs.len() as u16);
            for &(second_id, value) in pairs {
                pair_pos.u16(second_id);
                pair_pos.i16(value);
            }
        }
        // Coverage format 2
        pair_pos.u16(2);
        pair_pos.u16(pair_set_count as u16);
        for (coverage_index, (first_id, _)) in by_first.iter().enumerate() {
            pair_pos.u16(*first_id);
            pair_pos.u16(*first_id);
            pair_pos.u16(coverage_index as u16);
        }

        // GPOS header + script list + feature list + lookup list.
        let mut w = Writer::new();
        w.u16(1); // majorVersion
        w.u16(0); // minorVersion
        w.u16(10); // scriptListOffset
        w.u16(12); // featureListOffset
        w.u16(26); // lookupListOffset

        // Script list (empty) at 10
        w.u16(0);

        // Feature list at 12: one record, feature table at +8
        w.u16(1);
        w.tag(b"kern");
        w.u16(8);
        // Feature table at 12 + 8 = 20
        w.u16(0); // featureParamsOffset
        w.u16(1); // lookupIndexCount
        w.u16(0); // lookup index 0

        // Lookup list at 26: one lookup at +4
        w.u16(1);
        w.u16(4);
        // Lookup table at 30
        w.u16(9); // lookupType: Extension Positioning
        w.u16(0); // lookupFlag
        w.u16(1); // subTableCount
        w.u16(8); // subtable offset (from lookup start)
        // Extension subtable at 38
        w.u16(1); // posFormat
        w.u16(2); // extensionLookupType: Pair Adjustment
        w.u32(8); // extensionOffset (from extension subtable start)
        // Pair Adjustment subtable at 46
        w.bytes.extend_from_slice(&pair_pos.bytes);
        w.bytes
    }
}

fn build_maxp(num_glyphs: u16) -> Vec<u8> {
    let mut w = Writer::new();
    w.u32(0x0000_5000); // version 0.5
    w.u16(num_glyphs);
    w.bytes
}

/// Lay out the offset table, directory, and padded tables, computing the
/// directory checksums over the padded bytes.
fn assemble(tables: Vec<([u8; 4], Vec<u8>)>) -> BuiltFont {
    let num_tables = tables.len() as u16;
    let directory_len = 12 + 16 * tables.len();

    let mut offsets = Vec::with_capacity(tables.len());
    let mut running = directory_len;
    for (_, bytes) in &tables {
        offsets.push(running as u32);
        running += bytes.len().div_ceil(4) * 4;
    }

    let mut w = Writer::new();
    w.u32(0x0001_0000); // sfnt version
    w.u16(num_tables);
    let max_pow2 = 2u16.pow((num_tables as f32).log2().floor() as u32);
    w.u16(max_pow2 * 16); // searchRange
    w.u16((num_tables as f32).log2().floor() as u16); // entrySelector
    w.u16(num_tables * 16 - max_pow2 * 16); // rangeShift

    let mut directory = Vec::with_capacity(tables.len());
    for ((tag, bytes), &offset) in tables.iter().zip(&offsets) {
        let mut padded = bytes.clone();
        padded.resize(bytes.len().div_ceil(4) * 4, 0);
        w.tag(tag);
        w.u32(checksum(&padded));
        w.u32(offset);
        w.u32(bytes.len() as u32);
        directory.push((*tag, offset, bytes.len() as u32));
    }

    for (_, bytes) in &tables {
        w.bytes.extend_from_slice(bytes);
        while w.bytes.len() % 4 != 0 {
            w.bytes.push(0);
        }
    }

    BuiltFont {
        data: w.bytes,
        tables: directory,
    }
}

fn checksum(padded: &[u8]) -> u32 {
    padded
        .chunks_exact(4)
        .fold(0u32, |sum, chunk| {
            sum.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        })
}

struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    fn u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn i16(&mut self, value: i16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn tag(&mut self, tag: &[u8; 4]) {
        self.bytes.extend_from_slice(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_font_has_seven_tables() {
        let font = minimal_font();
        assert_eq!(font.tables.len(), 7);
        assert!(font.table_range(b"glyf").is_some());
        assert!(font.table_range(b"GPOS").is_none());
    }

    #[test]
    fn kerning_adds_gpos() {
        let font = FontSpec {
            glyphs: vec![
                GlyphSpec {
                    ch: 'A',
                    advance: 600,
                    lsb: 50,
                    bbox: (50, 0, 550, 700),
                },
                GlyphSpec {
                    ch: 'V',
                    advance: 600,
                    lsb: 50,
                    bbox: (50, 0, 550, 700),
                },
            ],
            kerning: vec![('A', 'V', -80)],
            ..FontSpec::default()
        }
        .build();
        assert!(font.table_range(b"GPOS").is_some());
    }

    #[test]
    fn tables_are_four_byte_aligned() {
        let font = alphabet_font();
        for (tag, offset, _) in &font.tables {
            assert_eq!(offset % 4, 0, "table {tag:?} is misaligned");
        }
    }
}
