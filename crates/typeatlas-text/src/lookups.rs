//! The queryable bundle a font becomes after parsing and packing
//!
//! `Lookups` is everything shaping needs, built once per font and shared
//! read-only: glyph metrics keyed by code point, atlas layout and UV
//! rectangles, vertical metrics, and the kerning table. It keeps the parsed
//! font alive behind an `Arc` so kerning queries can resolve code points
//! through the cmap.

use std::collections::HashMap;
use std::sync::Arc;

use typeatlas_atlas::{layout_glyphs, AtlasLayout};
use typeatlas_core::{FontError, PixelRect, Result, UvRect};
use typeatlas_ttf::{glyph_quads, Glyph, TtfFont};

use crate::kerning::KerningTable;

/// Options for building [`Lookups`].
#[derive(Debug, Clone, Default)]
pub struct LookupsOptions {
    /// Characters to include. `None` includes every code point in the
    /// font's cmap.
    pub alphabet: Option<String>,
}

/// Immutable per-font lookup tables. Build once, share everywhere.
#[derive(Debug, Clone)]
pub struct Lookups {
    pub units_per_em: u16,
    /// Vertical extent used for line boxes: ascender plus (negative)
    /// descender, in font units.
    pub cap_height: i32,
    pub ascender: i16,
    pub atlas: AtlasLayout,
    glyphs: Vec<Glyph>,
    by_code: HashMap<u32, usize>,
    uvs: HashMap<u32, UvRect>,
    kerning: KerningTable,
    font: Arc<TtfFont>,
}

/// Resolve glyphs for the requested alphabet, pack their quads into an
/// atlas layout, and wire up kerning.
pub fn build_lookups(font: Arc<TtfFont>, options: &LookupsOptions) -> Result<Lookups> {
    let glyphs = glyph_quads(&font, options.alphabet.as_deref())?;
    let layout = layout_glyphs(&glyphs, font.head.units_per_em);
    debug_assert_eq!(layout.positions.len(), glyphs.len());

    let mut by_code = HashMap::with_capacity(glyphs.len());
    let mut uvs = HashMap::with_capacity(glyphs.len());
    for (i, glyph) in glyphs.iter().enumerate() {
        let (x, y) = layout.positions[i];
        let (width, height) = layout.sizes[i];
        let rect = PixelRect {
            x,
            y,
            width,
            height,
        };
        by_code.insert(glyph.id, i);
        uvs.insert(glyph.id, rect.to_uv(layout.width, layout.height));
    }

    let kerning = KerningTable::from_gpos(font.gpos.as_ref());
    log::debug!(
        "lookups ready: {} glyphs, atlas {}x{}, {} kerning sources",
        glyphs.len(),
        layout.width,
        layout.height,
        kerning.source_count()
    );

    Ok(Lookups {
        units_per_em: font.head.units_per_em,
        cap_height: font.hhea.ascender as i32 + font.hhea.descender as i32,
        ascender: font.hhea.ascender,
        atlas: layout,
        glyphs,
        by_code,
        uvs,
        kerning,
        font,
    })
}

impl Lookups {
    /// Metrics for a character, if it was part of the built alphabet.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.by_code.get(&(ch as u32)).map(|&i| &self.glyphs[i])
    }

    /// All glyphs, in atlas layout order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Atlas-relative UV rectangle for a character.
    pub fn uv(&self, ch: char) -> Option<UvRect> {
        self.uvs.get(&(ch as u32)).copied()
    }

    /// Horizontal kerning between two characters, in font design units.
    ///
    /// Fonts without kerning data answer zero for every pair. With kerning
    /// data present, both characters must resolve through the cmap or the
    /// call fails with [`FontError::GlyphNotFound`].
    pub fn kern(&self, first: char, second: char) -> Result<i16> {
        if self.kerning.is_empty() {
            return Ok(0);
        }

        let first_id = self
            .font
            .glyph_index(first)
            .ok_or_else(|| FontError::glyph_not_found(first))?;
        let second_id = self
            .font
            .glyph_index(second)
            .ok_or_else(|| FontError::glyph_not_found(second))?;

        Ok(self.kerning.adjustment(first_id, second_id))
    }

    /// The parsed font backing these lookups.
    pub fn font(&self) -> &Arc<TtfFont> {
        &self.font
    }
}
