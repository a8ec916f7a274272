//! Glyph instance accumulation for the renderer
//!
//! A `TextBatch` is the single-owner staging area between shaping and the
//! GPU: successive `text()` calls append fixed-stride records, and the
//! renderer drains them with `flush()` once per frame into its storage
//! buffer. One batch per thread; the records are plain `f32`s so the caller
//! can upload them without any conversion.

use typeatlas_core::{FontError, Result, Size, Vec2};

use crate::shape::{shape_text, Shape, ShapingOptions};
use crate::store::FontSlot;

/// Initial capacity of the instance buffer, in floats.
pub const TEXT_BUFFER_SIZE: usize = 16 * 1000;

/// Floats per glyph instance record.
pub const GLYPH_INSTANCE_FLOATS: usize = 16;

/// What a `text()` call reports back: where the text box went and how big
/// it is, for layout purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub bounds: Size,
    pub position: Vec2,
    pub font_size: f32,
}

/// Accumulates glyph instance records between renderer flushes.
pub struct TextBatch {
    slot: FontSlot,
    viewport_width: f32,
    viewport_height: f32,
    pixel_ratio: f32,
    default_color: [f32; 4],
    shaping: ShapingOptions,
    glyph_data: Vec<f32>,
    glyph_count: usize,
}

impl TextBatch {
    /// A batch drawing into a viewport of the given pixel dimensions.
    pub fn new(slot: FontSlot, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            slot,
            viewport_width,
            viewport_height,
            pixel_ratio: 1.0,
            default_color: [0.0, 0.0, 0.0, 1.0],
            shaping: ShapingOptions::default(),
            glyph_data: Vec::with_capacity(TEXT_BUFFER_SIZE),
            glyph_count: 0,
        }
    }

    /// Device pixel ratio the viewport dimensions are divided by in the
    /// instance records.
    pub fn pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Color used when a `text()` call does not pass one.
    pub fn default_color(mut self, color: [f32; 4]) -> Self {
        self.default_color = color;
        self
    }

    /// Shaping options applied to every `text()` call.
    pub fn shaping(mut self, shaping: ShapingOptions) -> Self {
        self.shaping = shaping;
        self
    }

    /// Swap the font slot; already accumulated records are kept.
    pub fn set_slot(&mut self, slot: FontSlot) {
        self.slot = slot;
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Shape `text` and append one instance record per glyph.
    ///
    /// With an [`FontSlot::Absent`] slot this is a no-op returning `None`:
    /// no font configured means nothing to draw, by design.
    pub fn text(
        &mut self,
        text: &str,
        position: Vec2,
        font_size: f32,
        color: Option<[f32; 4]>,
    ) -> Result<Option<TextPlacement>> {
        let font = match &self.slot {
            FontSlot::Loaded(font) => font.clone(),
            FontSlot::Absent => return Ok(None),
        };

        let shape: Shape = shape_text(&font.lookups, text, font_size, &self.shaping)?;
        let color = color.unwrap_or(self.default_color);
        let viewport_width = self.viewport_width / self.pixel_ratio;
        let viewport_height = self.viewport_height / self.pixel_ratio;

        for (i, ch) in text.chars().enumerate() {
            let glyph_position = shape.positions[i].add(position);
            let size = shape.sizes[i];
            let uv = font
                .lookups
                .uv(ch)
                .ok_or_else(|| FontError::glyph_not_found(ch))?;

            self.glyph_data.extend_from_slice(&[
                glyph_position.x,
                glyph_position.y,
                position.y,
                font_size,
                color[0],
                color[1],
                color[2],
                color[3],
                size.x,
                size.y,
                uv.x,
                uv.y,
                uv.width,
                uv.height,
                viewport_width,
                viewport_height,
            ]);
            self.glyph_count += 1;
        }

        Ok(Some(TextPlacement {
            bounds: shape.bounds,
            position,
            font_size,
        }))
    }

    /// Hand the accumulated records to the renderer and reset the batch.
    pub fn flush(&mut self) -> (Vec<f32>, usize) {
        let count = self.glyph_count;
        self.glyph_count = 0;
        let data = std::mem::replace(
            &mut self.glyph_data,
            Vec::with_capacity(TEXT_BUFFER_SIZE),
        );
        (data, count)
    }
}
