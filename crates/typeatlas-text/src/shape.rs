//! Kerning-aware text shaping
//!
//! A single forward pass over the string: each character advances the pen by
//! its bearings, ink width, and kerning against the previous character, all
//! scaled from font units to the requested pixel size. Every emitted quad is
//! grown by the atlas gap (scaled to the requested size) so the renderer
//! samples past the glyph's SDF cell edge without picking up neighbors.

use typeatlas_atlas::{ATLAS_FONT_SIZE, ATLAS_GAP};
use typeatlas_core::{FontError, Result, Size, Vec2};

use crate::lookups::Lookups;

/// Per-call shaping options.
#[derive(Debug, Clone, Copy)]
pub struct ShapingOptions {
    /// Apply pair kerning. On by default.
    pub kerning: bool,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self { kerning: true }
    }
}

/// The result of shaping one string: screen-space quad per glyph plus the
/// overall bounding rectangle. Positions and sizes are index-matched to the
/// string's characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub positions: Vec<Vec2>,
    pub sizes: Vec<Vec2>,
    pub bounds: Size,
}

/// Shape `text` at `font_size` pixels. Pure function of its inputs: the
/// same lookups, text, and size always produce the same shape.
pub fn shape_text(
    lookups: &Lookups,
    text: &str,
    font_size: f32,
    options: &ShapingOptions,
) -> Result<Shape> {
    let chars: Vec<char> = text.chars().collect();
    let mut positions = Vec::with_capacity(chars.len());
    let mut sizes = Vec::with_capacity(chars.len());

    let scale = font_size / lookups.units_per_em as f32;
    let padding = ATLAS_GAP as f32 * font_size / ATLAS_FONT_SIZE as f32;

    let mut pen_x = 0.0f32;
    for (i, &ch) in chars.iter().enumerate() {
        let glyph = lookups
            .glyph(ch)
            .ok_or_else(|| FontError::glyph_not_found(ch))?;

        let kerning = if options.kerning && i > 0 {
            lookups.kern(chars[i - 1], ch)? as f32
        } else {
            0.0
        };

        positions.push(Vec2::new(
            pen_x + (glyph.lsb as f32 + kerning) * scale - padding,
            (lookups.cap_height - glyph.y - glyph.height) as f32 * scale - padding,
        ));
        // Padding on both sides of the glyph.
        sizes.push(Vec2::new(
            glyph.width as f32 * scale + padding * 2.0,
            glyph.height as f32 * scale + padding * 2.0,
        ));

        pen_x += (glyph.lsb as f32 + kerning + glyph.width as f32 + glyph.rsb as f32) * scale;
    }

    // The pen has advanced past the last glyph's right side bearing: that
    // is the layout width, independent of the sampling padding baked into
    // the individual quads.
    let width = pen_x;
    let height = lookups.cap_height as f32 * font_size / lookups.units_per_em as f32;

    Ok(Shape {
        positions,
        sizes,
        // Round up to avoid layout gaps.
        bounds: Size {
            width: width.ceil(),
            height: height.ceil(),
        },
    })
}
