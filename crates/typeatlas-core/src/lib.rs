//! Typeatlas core: the shared vocabulary of the font pipeline
//!
//! A font file enters as raw bytes and leaves as a packed glyph atlas plus
//! instance data a GPU renderer can draw directly. This crate holds the types
//! every stage speaks:
//!
//! 1. **Parsing** - TTF tables become metrics, mappings, and kerning data
//! 2. **Packing** - glyph boxes find their cells in a square atlas
//! 3. **Rasterizing** - glyph coverage lands in the atlas, then becomes a
//!    signed distance field
//! 4. **Shaping** - a string becomes per-glyph positions and sizes
//! 5. **Batching** - shaped glyphs become fixed-stride instance records
//!
//! The stages themselves live in `typeatlas-ttf`, `typeatlas-atlas`, and
//! `typeatlas-text`. The GPU side (device, pipeline, texture upload) is a
//! consumer of this data, never a dependency of it.

pub mod bitmap;
pub mod diagnostics;
pub mod error;
pub mod geom;
pub mod traits;

pub use bitmap::{Bitmap, PixelFormat};
pub use diagnostics::Diagnostic;
pub use error::{FontError, Result};
pub use geom::{PixelRect, Size, UvRect, Vec2};
pub use traits::{GlyphRasterizer, RasterGlyph};
