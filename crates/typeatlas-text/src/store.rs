// this_file: crates/typeatlas-text/src/store.rs

//! Explicit font cache and the Loaded/Absent slot
//!
//! Fonts are expensive to prepare (parse, pack, rasterize, SDF), so the
//! store memoizes the finished [`LoadedFont`] per caller-chosen key — a URL,
//! a path, a family name, whatever identifies the source. Invalidation is
//! explicit; nothing is evicted behind the caller's back, and a failed load
//! leaves the cache untouched.
//!
//! "No font configured" is a value, not a stub implementation:
//! [`FontSlot::Absent`] makes a [`TextBatch`](crate::TextBatch) skip its
//! `text()` calls instead of dispatching to a do-nothing renderer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use typeatlas_atlas::{render_atlas, AtlasOptions};
use typeatlas_core::{Bitmap, GlyphRasterizer, Result};
use typeatlas_ttf::{parse_ttf, ParseSettings};

use crate::lookups::{build_lookups, Lookups, LookupsOptions};

/// A font that went through the whole preparation pipeline.
pub struct LoadedFont {
    pub lookups: Lookups,
    /// RGBA atlas; alpha carries the SDF (or raw coverage when the SDF pass
    /// was disabled).
    pub atlas: Bitmap,
}

/// Either a prepared font or explicitly no font at all.
#[derive(Clone)]
pub enum FontSlot {
    Loaded(Arc<LoadedFont>),
    Absent,
}

impl FontSlot {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&Arc<LoadedFont>> {
        match self {
            Self::Loaded(font) => Some(font),
            Self::Absent => None,
        }
    }
}

/// Options for the full load pipeline.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub parse: ParseSettings,
    pub lookups: LookupsOptions,
    pub atlas: AtlasOptions,
}

/// Run the full preparation pipeline once: parse, build lookups, render the
/// atlas, generate the SDF.
pub fn load_font(
    data: &[u8],
    rasterizer: &dyn GlyphRasterizer,
    options: &LoadOptions,
) -> Result<LoadedFont> {
    let font = Arc::new(parse_ttf(data, &options.parse)?);
    let lookups = build_lookups(font, &options.lookups)?;
    let atlas = render_atlas(
        lookups.glyphs(),
        &lookups.atlas,
        lookups.units_per_em,
        rasterizer,
        &options.atlas,
    )?;
    Ok(LoadedFont { lookups, atlas })
}

/// Keyed cache of prepared fonts.
#[derive(Default)]
pub struct FontStore {
    fonts: RwLock<HashMap<String, Arc<LoadedFont>>>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the font under `key`, or return the cached copy if the key
    /// was loaded before. Bytes are only parsed on a cache miss.
    pub fn load(
        &self,
        key: &str,
        data: &[u8],
        rasterizer: &dyn GlyphRasterizer,
        options: &LoadOptions,
    ) -> Result<Arc<LoadedFont>> {
        if let Some(font) = self.fonts.read().get(key) {
            return Ok(font.clone());
        }

        let font = Arc::new(load_font(data, rasterizer, options)?);
        self.fonts.write().insert(key.to_owned(), font.clone());
        log::debug!("font store: prepared {key:?}");
        Ok(font)
    }

    /// Slot for a key: `Loaded` when cached, `Absent` otherwise.
    pub fn slot(&self, key: &str) -> FontSlot {
        match self.fonts.read().get(key) {
            Some(font) => FontSlot::Loaded(font.clone()),
            None => FontSlot::Absent,
        }
    }

    /// Drop one cached font. Returns whether the key was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.fonts.write().remove(key).is_some()
    }

    /// Drop every cached font.
    pub fn clear(&self) {
        self.fonts.write().clear();
    }

    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.read().is_empty()
    }
}
