//! Glyph atlas construction: packing, rasterization, SDF
//!
//! Takes the glyph records `typeatlas-ttf` extracts and turns them into a
//! single square power-of-two texture: each glyph's padded bounding box is
//! shelf-packed into a cell, rasterized once at a fixed reference size, and
//! the whole sheet is converted into a signed distance field so the renderer
//! can draw any font size from one texture.

pub mod packer;
pub mod render;
pub mod sdf;

pub use packer::{pack_shelves, Packing};
pub use render::{render_atlas, AtlasOptions};
pub use sdf::to_sdf;

use typeatlas_ttf::Glyph;

/// Reference font size glyphs are rasterized at inside the atlas.
pub const ATLAS_FONT_SIZE: u32 = 48;

/// Empty pixels kept around each glyph inside its cell; half the SDF radius.
pub const ATLAS_GAP: u32 = 4;

/// SDF spread radius in pixels; roughly 1/6 of the reference font size.
pub const ATLAS_RADIUS: u32 = 8;

/// Pixel-space placement of every glyph in the atlas, index-matched to the
/// glyph list it was built from.
#[derive(Debug, Clone)]
pub struct AtlasLayout {
    pub width: u32,
    pub height: u32,
    pub positions: Vec<(u32, u32)>,
    pub sizes: Vec<(u32, u32)>,
}

/// Scale every glyph's design-space bounding box to the reference size, pad
/// it with the atlas gap, and pack the lot into a square atlas.
pub fn layout_glyphs(glyphs: &[Glyph], units_per_em: u16) -> AtlasLayout {
    let scale = ATLAS_FONT_SIZE as f32 / units_per_em as f32;
    let transform = |v: i32| (v as f32 * scale).ceil().max(0.0) as u32;

    let sizes: Vec<(u32, u32)> = glyphs
        .iter()
        .map(|glyph| {
            (
                transform(glyph.width) + ATLAS_GAP * 2,
                transform(glyph.height) + ATLAS_GAP * 2,
            )
        })
        .collect();

    let packing = pack_shelves(&sizes);
    debug_assert_eq!(packing.positions.len(), glyphs.len());

    AtlasLayout {
        width: packing.width,
        height: packing.height,
        positions: packing.positions,
        sizes,
    }
}
