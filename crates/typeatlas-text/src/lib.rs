//! Text shaping and batching on top of the atlas pipeline
//!
//! The last two stages between a font file and the GPU:
//!
//! - [`build_lookups`] turns a parsed font into the immutable [`Lookups`]
//!   bundle (glyph metrics, atlas UVs, kerning) shared by every shaping call.
//! - [`shape_text`] walks a string once and produces a [`Shape`]: per-glyph
//!   screen quads plus a bounding rectangle.
//! - [`TextBatch`] accumulates shaped glyphs as fixed-stride instance
//!   records for the renderer to drain.
//! - [`FontStore`] memoizes the whole preparation pipeline per font source.
//!
//! ```no_run
//! use std::sync::Arc;
//! use typeatlas_text::{build_lookups, shape_text, LookupsOptions, ShapingOptions};
//! use typeatlas_ttf::{parse_ttf, ParseSettings};
//!
//! let data = std::fs::read("font.ttf")?;
//! let font = Arc::new(parse_ttf(&data, &ParseSettings::default())?);
//! let lookups = build_lookups(font, &LookupsOptions { alphabet: Some("Hello".into()) })?;
//! let shape = shape_text(&lookups, "Hello", 16.0, &ShapingOptions::default())?;
//! println!("{} glyphs, {}px wide", shape.positions.len(), shape.bounds.width);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod kerning;
pub mod lookups;
pub mod shape;
pub mod store;

pub use batch::{TextBatch, TextPlacement, GLYPH_INSTANCE_FLOATS, TEXT_BUFFER_SIZE};
pub use kerning::{KerningSource, KerningTable};
pub use lookups::{build_lookups, Lookups, LookupsOptions};
pub use shape::{shape_text, Shape, ShapingOptions};
pub use store::{load_font, FontSlot, FontStore, LoadOptions, LoadedFont};
