//! Error types shared across the pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FontError>;

/// Failure taxonomy for font parsing and shaping.
///
/// The three parsing variants (`TruncatedData`, `UnsupportedFormat`,
/// `CorruptFont`) are fatal for the whole load: no partial font object is
/// ever produced. `GlyphNotFound` is fatal for the individual shaping or
/// lookup call that hit it.
#[derive(Debug, Error)]
pub enum FontError {
    /// A read ran past the end of the font buffer.
    #[error("unexpected end of data at byte {offset} (wanted {wanted} more)")]
    TruncatedData { offset: usize, wanted: usize },

    /// The file is not a TTF we can handle (wrong container, unsupported
    /// cmap/maxp/GPOS version, ...).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file claims to be TTF but its contents are inconsistent
    /// (checksum mismatch, bad magic number, missing required table).
    #[error("corrupt font: {0}")]
    CorruptFont(String),

    /// A character has no usable glyph in this font. Callers must register
    /// the full alphabet they intend to shape up front.
    #[error("no glyph for U+{codepoint:04X}")]
    GlyphNotFound { codepoint: u32 },
}

impl FontError {
    /// Shorthand for the common "character is not in the font" case.
    pub fn glyph_not_found(ch: char) -> Self {
        Self::GlyphNotFound {
            codepoint: ch as u32,
        }
    }
}
