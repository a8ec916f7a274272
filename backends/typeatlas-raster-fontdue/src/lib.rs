//! fontdue-backed glyph rasterization
//!
//! The atlas pipeline needs what a browser gets from the platform text
//! stack: hand over the font file, ask for coverage bitmaps per character.
//! `fontdue` plays that role here — it parses outlines and antialiases them
//! itself, so this backend works the same on every platform.

use typeatlas_core::{FontError, GlyphRasterizer, RasterGlyph, Result};

/// Rasterizer that owns a parsed `fontdue` font.
pub struct FontdueRasterizer {
    font: fontdue::Font,
}

impl FontdueRasterizer {
    /// Parse font bytes once; rasterization afterwards is allocation-per-
    /// glyph only.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|reason| {
                FontError::UnsupportedFormat(format!("fontdue rejected the font: {reason}"))
            })?;
        log::debug!("fontdue loaded font with {} glyphs", font.glyph_count());
        Ok(Self { font })
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn name(&self) -> &'static str {
        "fontdue"
    }

    fn rasterize(&self, ch: char, px_size: f32) -> Result<RasterGlyph> {
        if self.font.lookup_glyph_index(ch) == 0 {
            return Err(FontError::glyph_not_found(ch));
        }

        let (metrics, coverage) = self.font.rasterize(ch, px_size);
        Ok(RasterGlyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        })
    }
}
