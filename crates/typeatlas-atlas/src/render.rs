//! Compositing glyph coverage into the packed atlas
//!
//! Every glyph is rasterized once at the fixed reference size
//! [`ATLAS_FONT_SIZE`](crate::ATLAS_FONT_SIZE) and drawn into its packed
//! cell, offset by its own design-space bounding-box origin so baselines
//! stay consistent across glyphs of different shapes. The cell keeps an
//! [`ATLAS_GAP`](crate::ATLAS_GAP) margin of empty pixels on every side for
//! the SDF spread to breathe into.

use typeatlas_core::{Bitmap, GlyphRasterizer, PixelFormat, Result};
use typeatlas_ttf::Glyph;

use crate::{AtlasLayout, ATLAS_FONT_SIZE, ATLAS_GAP};

/// Knobs for atlas rendering.
#[derive(Debug, Clone, Copy)]
pub struct AtlasOptions {
    /// Run the SDF post-process over the finished coverage atlas.
    pub use_sdf: bool,
    /// SDF spread radius in pixels.
    pub radius: u32,
    /// Tint each glyph cell so packing problems are visible to the eye.
    pub debug_cell_backgrounds: bool,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            use_sdf: true,
            radius: crate::ATLAS_RADIUS,
            debug_cell_backgrounds: false,
        }
    }
}

/// Rasterize every glyph into its atlas cell and return the finished RGBA
/// bitmap. RGB is white throughout; coverage (or the distance field, after
/// [`to_sdf`](crate::sdf::to_sdf)) lives in the alpha channel.
pub fn render_atlas(
    glyphs: &[Glyph],
    layout: &AtlasLayout,
    units_per_em: u16,
    rasterizer: &dyn GlyphRasterizer,
    options: &AtlasOptions,
) -> Result<Bitmap> {
    let mut bitmap = Bitmap::new(layout.width, layout.height, PixelFormat::Rgba8);
    // White everywhere; only alpha varies.
    for pixel in bitmap.data.chunks_exact_mut(4) {
        pixel[0] = 255;
        pixel[1] = 255;
        pixel[2] = 255;
    }

    let scale = ATLAS_FONT_SIZE as f32 / units_per_em as f32;

    log::debug!(
        "rendering atlas {}x{} with {} glyphs via {}",
        layout.width,
        layout.height,
        glyphs.len(),
        rasterizer.name()
    );

    for (i, glyph) in glyphs.iter().enumerate() {
        let (cell_x, cell_y) = layout.positions[i];
        let (cell_w, cell_h) = layout.sizes[i];

        if options.debug_cell_backgrounds {
            fill_cell(&mut bitmap, cell_x, cell_y, cell_w, cell_h);
        }

        let raster = rasterizer.rasterize(glyph.character, ATLAS_FONT_SIZE as f32)?;
        if raster.width == 0 || raster.height == 0 {
            continue;
        }

        // Pen position such that the ink's design bbox lands ATLAS_GAP
        // inside the cell on every side.
        let pen_x = cell_x as f32 + ATLAS_GAP as f32 - glyph.x as f32 * scale;
        let baseline_y = cell_y as f32 + cell_h as f32 - ATLAS_GAP as f32 + glyph.y as f32 * scale;

        let dst_x = (pen_x + raster.xmin as f32).round() as i64;
        let dst_y = (baseline_y - (raster.ymin + raster.height as i32) as f32).round() as i64;

        blit_coverage(&mut bitmap, &raster.coverage, raster.width, dst_x, dst_y);
    }

    if options.use_sdf {
        bitmap = crate::sdf::to_sdf(&bitmap, options.radius);
    }

    Ok(bitmap)
}

fn blit_coverage(bitmap: &mut Bitmap, coverage: &[u8], width: u32, dst_x: i64, dst_y: i64) {
    let rows = coverage.len() as u32 / width.max(1);
    for row in 0..rows {
        let y = dst_y + row as i64;
        if y < 0 || y >= bitmap.height as i64 {
            continue;
        }
        for col in 0..width {
            let x = dst_x + col as i64;
            if x < 0 || x >= bitmap.width as i64 {
                continue;
            }
            let value = coverage[(row * width + col) as usize];
            let offset = bitmap.pixel_offset(x as u32, y as u32);
            bitmap.data[offset + 3] = bitmap.data[offset + 3].max(value);
        }
    }
}

fn fill_cell(bitmap: &mut Bitmap, x: u32, y: u32, w: u32, h: u32) {
    for row in y..(y + h).min(bitmap.height) {
        for col in x..(x + w).min(bitmap.width) {
            let offset = bitmap.pixel_offset(col, row);
            bitmap.data[offset] = 255;
            bitmap.data[offset + 1] = 0;
            bitmap.data[offset + 2] = 255;
            bitmap.data[offset + 3] = bitmap.data[offset + 3].max(76);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeatlas_core::RasterGlyph;

    /// Fills the glyph's design-space bounding box with solid coverage.
    struct BoxRasterizer {
        units_per_em: u16,
        boxes: Vec<(char, i32, i32)>, // (char, width, height) in font units
    }

    impl GlyphRasterizer for BoxRasterizer {
        fn name(&self) -> &'static str {
            "box"
        }

        fn rasterize(&self, ch: char, px_size: f32) -> Result<RasterGlyph> {
            let scale = px_size / self.units_per_em as f32;
            let (_, w, h) = self
                .boxes
                .iter()
                .find(|&&(c, _, _)| c == ch)
                .copied()
                .ok_or(typeatlas_core::FontError::glyph_not_found(ch))?;
            let width = (w as f32 * scale).ceil() as u32;
            let height = (h as f32 * scale).ceil() as u32;
            Ok(RasterGlyph {
                width,
                height,
                xmin: 0,
                ymin: 0,
                coverage: vec![255; (width * height) as usize],
            })
        }
    }

    fn test_glyph(ch: char) -> Glyph {
        Glyph {
            id: ch as u32,
            character: ch,
            x: 0,
            y: 0,
            width: 500,
            height: 700,
            lsb: 50,
            rsb: 50,
        }
    }

    #[test]
    fn coverage_lands_inside_the_cell() {
        let glyphs = vec![test_glyph('A')];
        let layout = crate::layout_glyphs(&glyphs, 1000);
        let rasterizer = BoxRasterizer {
            units_per_em: 1000,
            boxes: vec![('A', 500, 700)],
        };

        let bitmap = render_atlas(
            &glyphs,
            &layout,
            1000,
            &rasterizer,
            &AtlasOptions {
                use_sdf: false,
                ..AtlasOptions::default()
            },
        )
        .unwrap();

        let (cell_x, cell_y) = layout.positions[0];
        let (cell_w, cell_h) = layout.sizes[0];

        // Some ink somewhere in the cell interior.
        let mut inked = 0u32;
        for y in cell_y..cell_y + cell_h {
            for x in cell_x..cell_x + cell_w {
                if bitmap.data[bitmap.pixel_offset(x, y) + 3] > 0 {
                    inked += 1;
                }
            }
        }
        assert!(inked > 0, "glyph left no coverage in its cell");

        // Nothing outside any cell: total ink equals in-cell ink.
        let total: u32 = bitmap
            .data
            .chunks_exact(4)
            .map(|px| u32::from(px[3] > 0))
            .sum();
        assert_eq!(total, inked);
    }

    #[test]
    fn ink_respects_the_gap_margin() {
        let glyphs = vec![test_glyph('A')];
        let layout = crate::layout_glyphs(&glyphs, 1000);
        let rasterizer = BoxRasterizer {
            units_per_em: 1000,
            boxes: vec![('A', 500, 700)],
        };
        let bitmap = render_atlas(
            &glyphs,
            &layout,
            1000,
            &rasterizer,
            &AtlasOptions {
                use_sdf: false,
                ..AtlasOptions::default()
            },
        )
        .unwrap();

        let (cell_x, cell_y) = layout.positions[0];
        let (cell_w, _) = layout.sizes[0];

        // The first row of the cell is inside the gap: no ink.
        for x in cell_x..cell_x + cell_w {
            assert_eq!(bitmap.data[bitmap.pixel_offset(x, cell_y) + 3], 0);
        }
    }

    #[test]
    fn missing_character_propagates() {
        let glyphs = vec![test_glyph('Z')];
        let layout = crate::layout_glyphs(&glyphs, 1000);
        let rasterizer = BoxRasterizer {
            units_per_em: 1000,
            boxes: vec![('A', 500, 700)],
        };
        let result = render_atlas(
            &glyphs,
            &layout,
            1000,
            &rasterizer,
            &AtlasOptions::default(),
        );
        assert!(result.is_err());
    }
}
