//! Required TTF table structures and their parsers
//!
//! Each `read_*` function takes the reader plus the table's absolute file
//! offset and leaves the cursor where it found it. Field layouts follow the
//! OpenType specification; only the tables the atlas pipeline needs are
//! decoded, and `glyf` is decoded down to the per-glyph header (contour
//! count + bounding box) — outline points never matter for metrics-driven
//! shaping, the rasterizer consumes the raw font bytes instead.

use std::collections::HashMap;

use typeatlas_core::{FontError, Result};

use crate::reader::FontReader;

/// Directory entry for one table.
#[derive(Debug, Clone, Copy)]
pub struct TableRecord {
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// `head` — font-wide header.
#[derive(Debug, Clone)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: f32,
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

const HEAD_MAGIC: u32 = 0x5F0F3CF5;

pub fn read_head(reader: &mut FontReader<'_>, offset: usize) -> Result<HeadTable> {
    reader.run_at(offset, |r| {
        let head = HeadTable {
            major_version: r.read_u16()?,
            minor_version: r.read_u16()?,
            font_revision: r.read_fixed()?,
            checksum_adjustment: r.read_u32()?,
            magic_number: r.read_u32()?,
            flags: r.read_u16()?,
            units_per_em: r.read_u16()?,
            created: r.read_long_datetime()?,
            modified: r.read_long_datetime()?,
            x_min: r.read_fword()?,
            y_min: r.read_fword()?,
            x_max: r.read_fword()?,
            y_max: r.read_fword()?,
            mac_style: r.read_u16()?,
            lowest_rec_ppem: r.read_u16()?,
            font_direction_hint: r.read_i16()?,
            index_to_loc_format: r.read_i16()?,
            glyph_data_format: r.read_i16()?,
        };

        if head.magic_number != HEAD_MAGIC {
            return Err(FontError::CorruptFont(format!(
                "head magic number is {:#010x}, expected {:#010x}",
                head.magic_number, HEAD_MAGIC
            )));
        }

        Ok(head)
    })
}

/// One `cmap` encoding record (platform/encoding pair plus subtable offset).
#[derive(Debug, Clone, Copy)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub offset: u32,
}

impl EncodingRecord {
    /// Windows (3) with Unicode-capable encodings, or the Unicode platform
    /// (0) itself.
    fn is_unicode_capable(&self) -> bool {
        let windows = self.platform_id == 3 && matches!(self.encoding_id, 0 | 1 | 10);
        let unicode = self.platform_id == 0 && self.encoding_id <= 4;
        windows || unicode
    }
}

/// `cmap` — character to glyph index mapping, Format 4 only.
#[derive(Debug, Clone)]
pub struct CmapTable {
    pub version: u16,
    pub encoding_records: Vec<EncodingRecord>,
    pub format: u16,
    pub language: u16,
    pub seg_count: u16,
    pub glyph_index_map: HashMap<u32, u16>,
}

pub fn read_cmap(reader: &mut FontReader<'_>, offset: usize) -> Result<CmapTable> {
    reader.run_at(offset, |r| {
        let version = r.read_u16()?;
        if version != 0 {
            return Err(FontError::UnsupportedFormat(format!(
                "cmap table version {version}, expected 0"
            )));
        }

        let num_tables = r.read_u16()?;
        let mut encoding_records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            encoding_records.push(EncodingRecord {
                platform_id: r.read_u16()?,
                encoding_id: r.read_u16()?,
                offset: r.read_u32()?,
            });
        }

        let selected = encoding_records
            .iter()
            .find(|record| record.is_unicode_capable())
            .ok_or_else(|| {
                FontError::UnsupportedFormat("no Windows or Unicode cmap subtable".into())
            })?;

        r.set_position(offset + selected.offset as usize);
        let format = r.read_u16()?;
        if format != 4 {
            return Err(FontError::UnsupportedFormat(format!(
                "cmap subtable format {format}, expected 4"
            )));
        }

        let _length = r.read_u16()?;
        let language = r.read_u16()?;
        let seg_count_x2 = r.read_u16()?;
        let seg_count = seg_count_x2 / 2;
        let _search_range = r.read_u16()?;
        let _entry_selector = r.read_u16()?;
        let _range_shift = r.read_u16()?;

        let mut end_codes = Vec::with_capacity(seg_count as usize);
        for _ in 0..seg_count {
            end_codes.push(r.read_u16()?);
        }
        let _reserved_pad = r.read_u16()?;
        let mut start_codes = Vec::with_capacity(seg_count as usize);
        for _ in 0..seg_count {
            start_codes.push(r.read_u16()?);
        }
        let mut id_deltas = Vec::with_capacity(seg_count as usize);
        for _ in 0..seg_count {
            id_deltas.push(r.read_u16()?);
        }

        let id_range_offsets_start = r.position();
        let mut id_range_offsets = Vec::with_capacity(seg_count as usize);
        for _ in 0..seg_count {
            id_range_offsets.push(r.read_u16()?);
        }

        // The last segment is the 0xFFFF sentinel; it maps nothing.
        let mut glyph_index_map = HashMap::new();
        for i in 0..seg_count.saturating_sub(1) as usize {
            let start_code = start_codes[i];
            let end_code = end_codes[i];
            let id_delta = id_deltas[i];
            let id_range_offset = id_range_offsets[i];

            for code in start_code..=end_code {
                let glyph_index = if id_range_offset != 0 {
                    // Offsets are relative to this segment's own slot in the
                    // idRangeOffset array, two bytes per entry.
                    let glyph_index_offset = id_range_offsets_start
                        + id_range_offset as usize
                        + i * 2
                        + (code - start_code) as usize * 2;
                    let raw = r.run_at(glyph_index_offset, |r| r.read_u16())?;
                    if raw == 0 {
                        0
                    } else {
                        raw.wrapping_add(id_delta)
                    }
                } else {
                    code.wrapping_add(id_delta)
                };
                glyph_index_map.insert(code as u32, glyph_index);
            }
        }

        Ok(CmapTable {
            version,
            encoding_records,
            format,
            language,
            seg_count,
            glyph_index_map,
        })
    })
}

/// `maxp` — glyph count (versions 0.5 and 1.0).
#[derive(Debug, Clone, Copy)]
pub struct MaxpTable {
    pub version: u32,
    pub num_glyphs: u16,
}

pub fn read_maxp(reader: &mut FontReader<'_>, offset: usize) -> Result<MaxpTable> {
    reader.run_at(offset, |r| {
        let version = r.read_u32()?;
        if version != 0x00005000 && version != 0x00010000 {
            return Err(FontError::UnsupportedFormat(format!(
                "maxp table version {version:#010x}, expected 0x00005000 or 0x00010000"
            )));
        }
        let num_glyphs = r.read_u16()?;
        Ok(MaxpTable {
            version,
            num_glyphs,
        })
    })
}

/// `hhea` — horizontal layout header.
#[derive(Debug, Clone)]
pub struct HheaTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub metric_data_format: i16,
    pub number_of_h_metrics: u16,
}

pub fn read_hhea(reader: &mut FontReader<'_>, offset: usize) -> Result<HheaTable> {
    reader.run_at(offset, |r| {
        let major_version = r.read_u16()?;
        let minor_version = r.read_u16()?;
        let ascender = r.read_fword()?;
        let descender = r.read_fword()?;
        let line_gap = r.read_fword()?;
        let advance_width_max = r.read_u16()?;
        let min_left_side_bearing = r.read_fword()?;
        let min_right_side_bearing = r.read_fword()?;
        let x_max_extent = r.read_fword()?;
        let caret_slope_rise = r.read_i16()?;
        let caret_slope_run = r.read_i16()?;
        let caret_offset = r.read_fword()?;
        for _ in 0..4 {
            let _reserved = r.read_i16()?;
        }
        let metric_data_format = r.read_i16()?;
        let number_of_h_metrics = r.read_u16()?;

        Ok(HheaTable {
            major_version,
            minor_version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format,
            number_of_h_metrics,
        })
    })
}

/// One explicit advance/bearing pair from `hmtx`.
#[derive(Debug, Clone, Copy)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// `hmtx` — per-glyph horizontal metrics.
///
/// When `number_of_h_metrics < num_glyphs`, the trailing glyphs reuse the
/// last explicit advance width and carry only a bare left side bearing.
#[derive(Debug, Clone)]
pub struct HmtxTable {
    pub h_metrics: Vec<LongHorMetric>,
    pub left_side_bearings: Vec<i16>,
}

pub fn read_hmtx(
    reader: &mut FontReader<'_>,
    offset: usize,
    num_glyphs: u16,
    number_of_h_metrics: u16,
) -> Result<HmtxTable> {
    reader.run_at(offset, |r| {
        let trailing = num_glyphs.checked_sub(number_of_h_metrics).ok_or_else(|| {
            FontError::CorruptFont(format!(
                "hhea claims {number_of_h_metrics} hMetrics but maxp has only {num_glyphs} glyphs"
            ))
        })?;

        let mut h_metrics = Vec::with_capacity(number_of_h_metrics as usize);
        for _ in 0..number_of_h_metrics {
            h_metrics.push(LongHorMetric {
                advance_width: r.read_u16()?,
                left_side_bearing: r.read_i16()?,
            });
        }

        let mut left_side_bearings = Vec::with_capacity(trailing as usize);
        for _ in 0..trailing {
            left_side_bearings.push(r.read_i16()?);
        }

        debug_assert_eq!(
            h_metrics.len() + left_side_bearings.len(),
            num_glyphs as usize
        );

        Ok(HmtxTable {
            h_metrics,
            left_side_bearings,
        })
    })
}

/// `loca` — raw offsets into `glyf`, one per glyph plus a terminator.
///
/// Short-format offsets are stored halved in the file; the factor is applied
/// when indexing `glyf`, not here.
#[derive(Debug, Clone)]
pub struct LocaTable {
    pub offsets: Vec<u32>,
}

pub fn read_loca(
    reader: &mut FontReader<'_>,
    offset: usize,
    num_glyphs: u16,
    index_to_loc_format: i16,
) -> Result<LocaTable> {
    reader.run_at(offset, |r| {
        let count = num_glyphs as usize + 1;
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let value = if index_to_loc_format == 0 {
                r.read_u16()? as u32
            } else {
                r.read_u32()?
            };
            offsets.push(value);
        }
        Ok(LocaTable { offsets })
    })
}

/// Per-glyph header from `glyf`: contour count and design-space bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphHeader {
    pub number_of_contours: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

pub fn read_glyf(
    reader: &mut FontReader<'_>,
    offset: usize,
    loca: &LocaTable,
    index_to_loc_format: i16,
) -> Result<Vec<GlyphHeader>> {
    let multiplier = if index_to_loc_format == 0 { 2 } else { 1 };

    let mut headers = Vec::with_capacity(loca.offsets.len().saturating_sub(1));
    for window in loca.offsets.windows(2) {
        // Equal consecutive offsets mean a glyph with no outline (space and
        // friends): nothing to read, empty bounding box.
        if window[0] == window[1] {
            headers.push(GlyphHeader::default());
            continue;
        }

        let glyph_offset = offset + window[0] as usize * multiplier;
        let header = reader.run_at(glyph_offset, |r| {
            Ok(GlyphHeader {
                number_of_contours: r.read_i16()?,
                x_min: r.read_i16()?,
                y_min: r.read_i16()?,
                x_max: r.read_i16()?,
                y_max: r.read_i16()?,
            })
        })?;
        headers.push(header);
    }

    Ok(headers)
}

/// Running 32-bit checksum over a table's bytes, zero-padding the tail to a
/// 4-byte boundary as the spec prescribes.
pub fn table_checksum(bytes: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        sum = sum.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut word = [0u8; 4];
        word[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}
