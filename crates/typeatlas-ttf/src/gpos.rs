//! GPOS parsing: the kerning subset
//!
//! Only the slice of GPOS that feeds pair kerning is decoded: the `kern`
//! feature's lookup indices, and Extension Positioning lookups (type 9)
//! wrapping Pair Adjustment (type 2) in posFormat 1 (explicit glyph pairs)
//! or posFormat 2 (class pair matrix). Everything else in the table is
//! recorded as a [`Diagnostic`] and contributes no kerning; a font with an
//! exotic GPOS still loads, it just spaces those pairs at their plain
//! advances.

use typeatlas_core::{Diagnostic, FontError, Result};

use crate::reader::FontReader;

/// `GPOS` — the decoded kerning-relevant subset.
#[derive(Debug, Clone)]
pub struct GposTable {
    pub features: Vec<FeatureRecord>,
    pub lookups: Vec<GposLookup>,
}

/// One feature and the lookup list entries it activates.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub tag: [u8; 4],
    pub lookup_list_indices: Vec<u16>,
}

/// One lookup list entry. Subtables we cannot interpret are simply absent.
#[derive(Debug, Clone)]
pub struct GposLookup {
    pub lookup_type: u16,
    pub lookup_flag: u16,
    pub mark_filtering_set: Option<u16>,
    pub subtables: Vec<PairAdjustment>,
}

/// A Pair Adjustment subtable, either explicit pairs or a class matrix.
#[derive(Debug, Clone)]
pub enum PairAdjustment {
    /// posFormat 1: per-glyph pair sets, indexed through the coverage table.
    Pairs {
        coverage: Coverage,
        pair_sets: Vec<Vec<PairValue>>,
    },
    /// posFormat 2: two ClassDefs and a class1 x class2 record matrix.
    Classes {
        coverage: Coverage,
        first_classes: ClassDef,
        second_classes: ClassDef,
        records: Vec<Vec<ClassRecord>>,
    },
}

/// Adjustment for one explicit glyph pair.
#[derive(Debug, Clone)]
pub struct PairValue {
    pub second_glyph: u16,
    pub value1: Option<ValueRecord>,
    pub value2: Option<ValueRecord>,
}

/// Adjustment for one class pair.
#[derive(Debug, Clone, Default)]
pub struct ClassRecord {
    pub value1: Option<ValueRecord>,
    pub value2: Option<ValueRecord>,
}

/// Positioning deltas, present per the subtable's value format flags.
/// Kerning only ever consumes `x_advance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
    pub x_pla_device: Option<i16>,
    pub y_pla_device: Option<i16>,
    pub x_adv_device: Option<i16>,
    pub y_adv_device: Option<i16>,
}

/// Coverage table, format 2 (glyph ID ranges) only.
#[derive(Debug, Clone)]
pub enum Coverage {
    Ranges(Vec<RangeRecord>),
}

#[derive(Debug, Clone, Copy)]
pub struct RangeRecord {
    pub start_glyph_id: u16,
    pub end_glyph_id: u16,
    pub start_coverage_index: u16,
}

/// ClassDef table, formats 1 (run of classes from a start glyph) and 2
/// (glyph ID ranges).
#[derive(Debug, Clone)]
pub enum ClassDef {
    List { start_glyph: u16, classes: Vec<u16> },
    Ranges(Vec<ClassRange>),
}

#[derive(Debug, Clone, Copy)]
pub struct ClassRange {
    pub start_glyph_id: u16,
    pub end_glyph_id: u16,
    pub class: u16,
}

const LOOKUP_PAIR_ADJUSTMENT: u16 = 2;
const LOOKUP_EXTENSION_POSITIONING: u16 = 9;

pub fn read_gpos(
    reader: &mut FontReader<'_>,
    offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<GposTable> {
    reader.run_at(offset, |r| {
        let major = r.read_u16()?;
        let minor = r.read_u16()?;
        if major != 1 || minor != 0 {
            return Err(FontError::UnsupportedFormat(format!(
                "GPOS version {major}.{minor}, expected 1.0"
            )));
        }

        let _script_list_offset = r.read_u16()?;
        let feature_list_offset = offset + r.read_u16()? as usize;
        let lookup_list_offset = offset + r.read_u16()? as usize;

        let features = read_feature_list(r, feature_list_offset)?;
        let lookups = read_lookup_list(r, lookup_list_offset, diagnostics, debug)?;

        Ok(GposTable { features, lookups })
    })
}

fn read_feature_list(
    reader: &mut FontReader<'_>,
    feature_list_offset: usize,
) -> Result<Vec<FeatureRecord>> {
    reader.run_at(feature_list_offset, |r| {
        let feature_count = r.read_u16()?;

        let mut records = Vec::with_capacity(feature_count as usize);
        for _ in 0..feature_count {
            let tag = r.read_tag()?;
            let table_offset = r.read_u16()?;
            records.push((tag, table_offset));
        }

        let mut features = Vec::with_capacity(records.len());
        for (tag, table_offset) in records {
            let feature = r.run_at(feature_list_offset + table_offset as usize, |r| {
                let _params_offset = r.read_u16()?;
                let lookup_index_count = r.read_u16()?;
                let mut lookup_list_indices = Vec::with_capacity(lookup_index_count as usize);
                for _ in 0..lookup_index_count {
                    lookup_list_indices.push(r.read_u16()?);
                }
                Ok(FeatureRecord {
                    tag,
                    lookup_list_indices,
                })
            })?;
            features.push(feature);
        }

        Ok(features)
    })
}

fn read_lookup_list(
    reader: &mut FontReader<'_>,
    lookup_list_offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Vec<GposLookup>> {
    let lookup_offsets = reader.run_at(lookup_list_offset, |r| {
        let lookup_count = r.read_u16()?;
        let mut offsets = Vec::with_capacity(lookup_count as usize);
        for _ in 0..lookup_count {
            offsets.push(r.read_u16()?);
        }
        Ok(offsets)
    })?;

    let mut lookups = Vec::with_capacity(lookup_offsets.len());
    for lookup_offset in lookup_offsets {
        let lookup_start = lookup_list_offset + lookup_offset as usize;
        let lookup = read_lookup(reader, lookup_start, diagnostics, debug)?;
        lookups.push(lookup);
    }
    Ok(lookups)
}

fn read_lookup(
    reader: &mut FontReader<'_>,
    lookup_start: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<GposLookup> {
    let (lookup_type, lookup_flag, subtable_offsets, mark_filtering_set) =
        reader.run_at(lookup_start, |r| {
            let lookup_type = r.read_u16()?;
            let lookup_flag = r.read_u16()?;
            let subtable_count = r.read_u16()?;
            let mut subtable_offsets = Vec::with_capacity(subtable_count as usize);
            for _ in 0..subtable_count {
                subtable_offsets.push(r.read_u16()?);
            }
            let mark_filtering_set = if lookup_flag & 0x0010 != 0 {
                Some(r.read_u16()?)
            } else {
                None
            };
            Ok((lookup_type, lookup_flag, subtable_offsets, mark_filtering_set))
        })?;

    let mut subtables = Vec::new();
    if lookup_type == LOOKUP_EXTENSION_POSITIONING {
        for subtable_offset in subtable_offsets {
            let subtable_start = lookup_start + subtable_offset as usize;
            if let Some(subtable) =
                read_extension_subtable(reader, subtable_start, diagnostics, debug)?
            {
                subtables.push(subtable);
            }
        }
    } else {
        Diagnostic::UnsupportedLookupType { lookup_type }.report(diagnostics, debug);
    }

    Ok(GposLookup {
        lookup_type,
        lookup_flag,
        mark_filtering_set,
        subtables,
    })
}

fn read_extension_subtable(
    reader: &mut FontReader<'_>,
    subtable_start: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<PairAdjustment>> {
    let (extension_lookup_type, extension_offset) = reader.run_at(subtable_start, |r| {
        let _pos_format = r.read_u16()?;
        let extension_lookup_type = r.read_u16()?;
        let extension_offset = r.read_u32()?;
        Ok((extension_lookup_type, extension_offset))
    })?;

    if extension_lookup_type != LOOKUP_PAIR_ADJUSTMENT {
        Diagnostic::UnsupportedExtensionType {
            extension_type: extension_lookup_type,
        }
        .report(diagnostics, debug);
        return Ok(None);
    }

    read_pair_adjustment(
        reader,
        subtable_start + extension_offset as usize,
        diagnostics,
        debug,
    )
}

fn read_pair_adjustment(
    reader: &mut FontReader<'_>,
    base: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<PairAdjustment>> {
    let pos_format = reader.run_at(base, |r| r.read_u16())?;

    match pos_format {
        1 => read_pair_pos_format1(reader, base, diagnostics, debug),
        2 => read_pair_pos_format2(reader, base, diagnostics, debug),
        _ => {
            Diagnostic::UnsupportedPairPosFormat { pos_format }.report(diagnostics, debug);
            Ok(None)
        }
    }
}

fn read_pair_pos_format1(
    reader: &mut FontReader<'_>,
    base: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<PairAdjustment>> {
    let (coverage_offset, value_format1, value_format2, pair_set_offsets) =
        reader.run_at(base + 2, |r| {
            let coverage_offset = r.read_u16()?;
            let value_format1 = r.read_u16()?;
            let value_format2 = r.read_u16()?;
            let pair_set_count = r.read_u16()?;
            let mut pair_set_offsets = Vec::with_capacity(pair_set_count as usize);
            for _ in 0..pair_set_count {
                pair_set_offsets.push(r.read_u16()?);
            }
            Ok((coverage_offset, value_format1, value_format2, pair_set_offsets))
        })?;

    let coverage = match read_coverage(reader, base + coverage_offset as usize, diagnostics, debug)?
    {
        Some(coverage) => coverage,
        None => return Ok(None),
    };

    let mut pair_sets = Vec::with_capacity(pair_set_offsets.len());
    for pair_set_offset in pair_set_offsets {
        let pair_set = reader.run_at(base + pair_set_offset as usize, |r| {
            let pair_value_count = r.read_u16()?;
            let mut pairs = Vec::with_capacity(pair_value_count as usize);
            for _ in 0..pair_value_count {
                let second_glyph = r.read_u16()?;
                let value1 = read_value_record(r, value_format1)?;
                let value2 = read_value_record(r, value_format2)?;
                pairs.push(PairValue {
                    second_glyph,
                    value1,
                    value2,
                });
            }
            Ok(pairs)
        })?;
        pair_sets.push(pair_set);
    }

    Ok(Some(PairAdjustment::Pairs {
        coverage,
        pair_sets,
    }))
}

fn read_pair_pos_format2(
    reader: &mut FontReader<'_>,
    base: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<PairAdjustment>> {
    let header = reader.run_at(base + 2, |r| {
        let coverage_offset = r.read_u16()?;
        let value_format1 = r.read_u16()?;
        let value_format2 = r.read_u16()?;
        let class_def1_offset = r.read_u16()?;
        let class_def2_offset = r.read_u16()?;
        let class1_count = r.read_u16()?;
        let class2_count = r.read_u16()?;
        Ok((
            coverage_offset,
            value_format1,
            value_format2,
            class_def1_offset,
            class_def2_offset,
            class1_count,
            class2_count,
        ))
    })?;
    let (
        coverage_offset,
        value_format1,
        value_format2,
        class_def1_offset,
        class_def2_offset,
        class1_count,
        class2_count,
    ) = header;

    let coverage = match read_coverage(reader, base + coverage_offset as usize, diagnostics, debug)?
    {
        Some(coverage) => coverage,
        None => return Ok(None),
    };

    let first_classes =
        match read_class_def(reader, base + class_def1_offset as usize, diagnostics, debug)? {
            Some(class_def) => class_def,
            None => return Ok(None),
        };
    let second_classes =
        match read_class_def(reader, base + class_def2_offset as usize, diagnostics, debug)? {
            Some(class_def) => class_def,
            None => return Ok(None),
        };

    // Class records follow the fixed header fields directly.
    let records = reader.run_at(base + 16, |r| {
        let mut records = Vec::with_capacity(class1_count as usize);
        for _ in 0..class1_count {
            let mut row = Vec::with_capacity(class2_count as usize);
            for _ in 0..class2_count {
                row.push(ClassRecord {
                    value1: read_value_record(r, value_format1)?,
                    value2: read_value_record(r, value_format2)?,
                });
            }
            records.push(row);
        }
        Ok(records)
    })?;

    Ok(Some(PairAdjustment::Classes {
        coverage,
        first_classes,
        second_classes,
        records,
    }))
}

fn read_value_record(
    reader: &mut FontReader<'_>,
    value_format: u16,
) -> Result<Option<ValueRecord>> {
    if value_format == 0 {
        return Ok(None);
    }

    let mut record = ValueRecord::default();
    if value_format & 0x0001 != 0 {
        record.x_placement = Some(reader.read_i16()?);
    }
    if value_format & 0x0002 != 0 {
        record.y_placement = Some(reader.read_i16()?);
    }
    if value_format & 0x0004 != 0 {
        record.x_advance = Some(reader.read_i16()?);
    }
    if value_format & 0x0008 != 0 {
        record.y_advance = Some(reader.read_i16()?);
    }
    if value_format & 0x0010 != 0 {
        record.x_pla_device = Some(reader.read_i16()?);
    }
    if value_format & 0x0020 != 0 {
        record.y_pla_device = Some(reader.read_i16()?);
    }
    if value_format & 0x0040 != 0 {
        record.x_adv_device = Some(reader.read_i16()?);
    }
    if value_format & 0x0080 != 0 {
        record.y_adv_device = Some(reader.read_i16()?);
    }

    Ok(Some(record))
}

fn read_coverage(
    reader: &mut FontReader<'_>,
    offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<Coverage>> {
    reader.run_at(offset, |r| {
        let coverage_format = r.read_u16()?;
        if coverage_format != 2 {
            Diagnostic::UnsupportedCoverageFormat { coverage_format }.report(diagnostics, debug);
            return Ok(None);
        }

        let range_count = r.read_u16()?;
        let mut ranges = Vec::with_capacity(range_count as usize);
        for _ in 0..range_count {
            ranges.push(RangeRecord {
                start_glyph_id: r.read_u16()?,
                end_glyph_id: r.read_u16()?,
                start_coverage_index: r.read_u16()?,
            });
        }
        Ok(Some(Coverage::Ranges(ranges)))
    })
}

fn read_class_def(
    reader: &mut FontReader<'_>,
    offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
    debug: bool,
) -> Result<Option<ClassDef>> {
    reader.run_at(offset, |r| {
        let class_def_format = r.read_u16()?;
        match class_def_format {
            1 => {
                let start_glyph = r.read_u16()?;
                let glyph_count = r.read_u16()?;
                let mut classes = Vec::with_capacity(glyph_count as usize);
                for _ in 0..glyph_count {
                    classes.push(r.read_u16()?);
                }
                Ok(Some(ClassDef::List {
                    start_glyph,
                    classes,
                }))
            }
            2 => {
                let range_count = r.read_u16()?;
                let mut ranges = Vec::with_capacity(range_count as usize);
                for _ in 0..range_count {
                    ranges.push(ClassRange {
                        start_glyph_id: r.read_u16()?,
                        end_glyph_id: r.read_u16()?,
                        class: r.read_u16()?,
                    });
                }
                Ok(Some(ClassDef::Ranges(ranges)))
            }
            _ => {
                Diagnostic::UnsupportedClassDefFormat { class_def_format }
                    .report(diagnostics, debug);
                Ok(None)
            }
        }
    })
}

impl ClassDef {
    /// Class for a glyph, or 0 when the glyph is not listed (class 0 is the
    /// implicit "everything else" class in OpenType).
    pub fn class_of(&self, glyph_id: u16) -> u16 {
        match self {
            Self::List {
                start_glyph,
                classes,
            } => {
                let index = glyph_id.wrapping_sub(*start_glyph) as usize;
                if glyph_id >= *start_glyph && index < classes.len() {
                    classes[index]
                } else {
                    0
                }
            }
            Self::Ranges(ranges) => ranges
                .iter()
                .find(|range| glyph_id >= range.start_glyph_id && glyph_id <= range.end_glyph_id)
                .map(|range| range.class)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_def_list_lookup() {
        let def = ClassDef::List {
            start_glyph: 10,
            classes: vec![1, 2, 3],
        };
        assert_eq!(def.class_of(10), 1);
        assert_eq!(def.class_of(12), 3);
        assert_eq!(def.class_of(13), 0);
        assert_eq!(def.class_of(9), 0);
    }

    #[test]
    fn class_def_range_lookup() {
        let def = ClassDef::Ranges(vec![
            ClassRange {
                start_glyph_id: 5,
                end_glyph_id: 8,
                class: 2,
            },
            ClassRange {
                start_glyph_id: 20,
                end_glyph_id: 20,
                class: 7,
            },
        ]);
        assert_eq!(def.class_of(5), 2);
        assert_eq!(def.class_of(8), 2);
        assert_eq!(def.class_of(20), 7);
        assert_eq!(def.class_of(9), 0);
    }

    #[test]
    fn value_record_reads_flagged_fields_only() {
        // x_advance only
        let data = [0xFF, 0xEC]; // -20
        let mut r = FontReader::new(&data);
        let record = read_value_record(&mut r, 0x0004).unwrap().unwrap();
        assert_eq!(record.x_advance, Some(-20));
        assert_eq!(record.x_placement, None);
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn value_record_zero_format_reads_nothing() {
        let data = [0x00, 0x01];
        let mut r = FontReader::new(&data);
        assert!(read_value_record(&mut r, 0).unwrap().is_none());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn unsupported_coverage_is_diagnostic_not_error() {
        // coverage format 1
        let data = [0x00, 0x01, 0x00, 0x00];
        let mut r = FontReader::new(&data);
        let mut diagnostics = Vec::new();
        let coverage = read_coverage(&mut r, 0, &mut diagnostics, false).unwrap();
        assert!(coverage.is_none());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnsupportedCoverageFormat { coverage_format: 1 }]
        );
    }
}
