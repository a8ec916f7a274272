//! Structured diagnostics for optional font features we skip
//!
//! Unsupported GPOS subtables are not errors: the font still loads and
//! shaping still works, kerning just degrades to zero for the affected
//! pairs. Each skip is recorded as a [`Diagnostic`] so callers can inspect
//! what was left on the floor instead of grepping log output.

use std::fmt;

/// One skipped optional feature, recorded during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// GPOS lookup of a type other than Extension Positioning (type 9).
    UnsupportedLookupType { lookup_type: u16 },
    /// Extension subtable wrapping something other than Pair Adjustment
    /// (type 2).
    UnsupportedExtensionType { extension_type: u16 },
    /// Pair Adjustment subtable with a posFormat other than 1 or 2.
    UnsupportedPairPosFormat { pos_format: u16 },
    /// Coverage table in a format other than 2 (range records).
    UnsupportedCoverageFormat { coverage_format: u16 },
    /// ClassDef table in a format other than 1 or 2.
    UnsupportedClassDefFormat { class_def_format: u16 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLookupType { lookup_type } => {
                write!(f, "GPOS lookup type {lookup_type} skipped (only Extension Positioning is read)")
            }
            Self::UnsupportedExtensionType { extension_type } => {
                write!(f, "GPOS extension type {extension_type} skipped (only Pair Adjustment is read)")
            }
            Self::UnsupportedPairPosFormat { pos_format } => {
                write!(f, "Pair Adjustment posFormat {pos_format} skipped")
            }
            Self::UnsupportedCoverageFormat { coverage_format } => {
                write!(f, "coverage format {coverage_format} skipped")
            }
            Self::UnsupportedClassDefFormat { class_def_format } => {
                write!(f, "ClassDef format {class_def_format} skipped")
            }
        }
    }
}

impl Diagnostic {
    /// Record the diagnostic, echoing to the log when `debug` is on.
    pub fn report(self, sink: &mut Vec<Diagnostic>, debug: bool) {
        if debug {
            log::warn!("{self}");
        }
        sink.push(self);
    }
}
