//! Kerning data distilled from GPOS, resolved at lookup time
//!
//! The parser hands over pair-adjustment subtables more or less as they sit
//! in the file. This module flattens them into [`KerningSource`] values — a
//! pair map or a class matrix — and answers per-pair queries with a fixed
//! precedence: an explicit pair always beats a class pair, and anything
//! unresolved kerns to zero.

use std::collections::HashMap;

use typeatlas_ttf::gpos::{ClassDef, Coverage, GposTable, PairAdjustment};

/// One source of kerning values.
#[derive(Debug, Clone)]
pub enum KerningSource {
    /// Explicit glyph pairs: first glyph -> second glyph -> x-advance delta.
    Pairs(HashMap<u16, HashMap<u16, i16>>),
    /// Class pairs: two glyph-class assignments and the adjustment matrix.
    Classes {
        first_classes: ClassDef,
        second_classes: ClassDef,
        records: Vec<Vec<i16>>,
    },
}

/// All kerning sources of a font, in GPOS order.
#[derive(Debug, Clone, Default)]
pub struct KerningTable {
    sources: Vec<KerningSource>,
}

impl KerningTable {
    /// Flatten the `kern` feature of a parsed GPOS table. A font without
    /// GPOS (or without a `kern` feature) yields an empty table.
    pub fn from_gpos(gpos: Option<&GposTable>) -> Self {
        let Some(gpos) = gpos else {
            return Self::default();
        };
        let Some(kern) = gpos.features.iter().find(|f| &f.tag == b"kern") else {
            return Self::default();
        };

        let mut sources = Vec::new();
        for &lookup_index in &kern.lookup_list_indices {
            let Some(lookup) = gpos.lookups.get(lookup_index as usize) else {
                continue;
            };
            for subtable in &lookup.subtables {
                match subtable {
                    PairAdjustment::Pairs {
                        coverage,
                        pair_sets,
                    } => {
                        if let Some(source) = flatten_pairs(coverage, pair_sets) {
                            sources.push(source);
                        }
                    }
                    PairAdjustment::Classes {
                        first_classes,
                        second_classes,
                        records,
                        ..
                    } => {
                        let records: Vec<Vec<i16>> = records
                            .iter()
                            .map(|row| {
                                row.iter()
                                    .map(|record| {
                                        record
                                            .value1
                                            .and_then(|value| value.x_advance)
                                            .unwrap_or(0)
                                    })
                                    .collect()
                            })
                            .collect();
                        sources.push(KerningSource::Classes {
                            first_classes: first_classes.clone(),
                            second_classes: second_classes.clone(),
                            records,
                        });
                    }
                }
            }
        }

        Self { sources }
    }

    pub fn from_sources(sources: Vec<KerningSource>) -> Self {
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Horizontal adjustment for a glyph pair, in font design units.
    ///
    /// Explicit pair entries win over class entries; glyphs in class 0 (the
    /// implicit "everything else" class) take no class kerning.
    pub fn adjustment(&self, first: u16, second: u16) -> i16 {
        for source in &self.sources {
            if let KerningSource::Pairs(pairs) = source {
                if let Some(value) = pairs.get(&first).and_then(|map| map.get(&second)) {
                    return *value;
                }
            }
        }

        for source in &self.sources {
            if let KerningSource::Classes {
                first_classes,
                second_classes,
                records,
            } = source
            {
                let first_class = first_classes.class_of(first);
                let second_class = second_classes.class_of(second);
                if first_class != 0 && second_class != 0 {
                    if let Some(value) = records
                        .get(first_class as usize)
                        .and_then(|row| row.get(second_class as usize))
                    {
                        return *value;
                    }
                }
            }
        }

        0
    }
}

/// Expand a coverage-driven pair-set list into a flat pair map. Pairs with
/// no x-advance contribute nothing.
fn flatten_pairs(
    coverage: &Coverage,
    pair_sets: &[Vec<typeatlas_ttf::gpos::PairValue>],
) -> Option<KerningSource> {
    let Coverage::Ranges(ranges) = coverage;

    let mut pairs: HashMap<u16, HashMap<u16, i16>> = HashMap::new();
    for range in ranges {
        for glyph_id in range.start_glyph_id..=range.end_glyph_id {
            let coverage_index =
                range.start_coverage_index + (glyph_id - range.start_glyph_id);
            let Some(pair_set) = pair_sets.get(coverage_index as usize) else {
                continue;
            };

            let mut map = HashMap::new();
            for pair in pair_set {
                if let Some(x_advance) = pair.value1.and_then(|value| value.x_advance) {
                    if x_advance != 0 {
                        map.insert(pair.second_glyph, x_advance);
                    }
                }
            }
            if !map.is_empty() {
                pairs.insert(glyph_id, map);
            }
        }
    }

    if pairs.is_empty() {
        None
    } else {
        Some(KerningSource::Pairs(pairs))
    }
}
