//! Per-character glyph metrics records
//!
//! Combines `cmap` (character to glyph index), `glyf` (bounding box), and
//! `hmtx` (advance/bearing) into the flat [`Glyph`] record the packer and
//! shaper work with. All values stay in font design units here; scaling to
//! pixels happens downstream.

use typeatlas_core::{FontError, Result};

use crate::TtfFont;

/// Metrics for one character, in font design units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Unicode code point. Not the TTF glyph index.
    pub id: u32,
    pub character: char,
    /// Bounding box origin (xMin, yMin).
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Left side bearing.
    pub lsb: i32,
    /// Right side bearing: advance minus bearing minus ink width.
    pub rsb: i32,
}

/// Build a [`Glyph`] record for every character of `alphabet`, or for every
/// code point in the font's cmap when no alphabet is given.
///
/// Characters that resolve to glyph index 0 (`.notdef`) or to nothing at all
/// fail with [`FontError::GlyphNotFound`]; a caller that wants to shape a
/// string later must get its full alphabet through here first.
pub fn glyph_quads(font: &TtfFont, alphabet: Option<&str>) -> Result<Vec<Glyph>> {
    let codes: Vec<u32> = match alphabet {
        Some(alphabet) => alphabet.chars().map(|ch| ch as u32).collect(),
        None => {
            let mut codes: Vec<u32> = font.cmap.glyph_index_map.keys().copied().collect();
            codes.sort_unstable();
            codes
        }
    };

    codes.into_iter().map(|code| glyph_quad(font, code)).collect()
}

fn glyph_quad(font: &TtfFont, code: u32) -> Result<Glyph> {
    let index = font
        .cmap
        .glyph_index_map
        .get(&code)
        .copied()
        .filter(|&index| index != 0)
        .ok_or(FontError::GlyphNotFound { codepoint: code })?;

    if index as usize >= font.glyf.len() {
        return Err(FontError::CorruptFont(format!(
            "glyph index {index} is out of bounds for glyf table of {} entries",
            font.glyf.len()
        )));
    }

    // Trailing glyphs reuse the advance width of the last explicit metric.
    let (advance_width, left_side_bearing) =
        if (index as usize) < font.hmtx.h_metrics.len() {
            let metric = font.hmtx.h_metrics[index as usize];
            (metric.advance_width, metric.left_side_bearing)
        } else {
            let last = font.hmtx.h_metrics.last().ok_or_else(|| {
                FontError::CorruptFont("hmtx table has no metrics at all".into())
            })?;
            let trailing_index = index as usize - font.hmtx.h_metrics.len();
            let lsb = font
                .hmtx
                .left_side_bearings
                .get(trailing_index)
                .copied()
                .ok_or_else(|| {
                    FontError::CorruptFont(format!(
                        "no left side bearing for glyph index {index}"
                    ))
                })?;
            (last.advance_width, lsb)
        };

    let header = font.glyf[index as usize];
    let width = header.x_max as i32 - header.x_min as i32;
    let height = header.y_max as i32 - header.y_min as i32;

    let character = char::from_u32(code)
        .ok_or(FontError::GlyphNotFound { codepoint: code })?;

    Ok(Glyph {
        id: code,
        character,
        x: header.x_min as i32,
        y: header.y_min as i32,
        width,
        height,
        lsb: left_side_bearing as i32,
        rsb: advance_width as i32 - left_side_bearing as i32 - width,
    })
}
