//! CLI argument definitions using Clap v4

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Typeatlas - SDF font atlases and text shaping from the command line
#[derive(Parser, Debug)]
#[command(name = "typeatlas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log skipped font features while parsing
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display a font's tables, metrics, and kerning summary
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Build the glyph atlas and export it as a PNG
    #[command(alias = "a")]
    Atlas(AtlasArgs),

    /// Shape a string and print per-glyph positions
    #[command(alias = "s")]
    Shape(ShapeArgs),
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Font file path (.ttf)
    pub font: PathBuf,
}

/// Arguments for the atlas command
#[derive(Parser, Debug)]
pub struct AtlasArgs {
    /// Font file path (.ttf)
    pub font: PathBuf,

    /// Output PNG path
    #[arg(short = 'o', long = "output", default_value = "atlas.png")]
    pub output: PathBuf,

    /// Characters to include (defaults to the whole cmap)
    #[arg(long)]
    pub alphabet: Option<String>,

    /// Keep raw coverage instead of running the SDF pass
    #[arg(long = "no-sdf")]
    pub no_sdf: bool,

    /// Tint glyph cells to make the packing visible
    #[arg(long = "debug-cells")]
    pub debug_cells: bool,
}

/// Arguments for the shape command
#[derive(Parser, Debug)]
pub struct ShapeArgs {
    /// Font file path (.ttf)
    pub font: PathBuf,

    /// Text to shape
    pub text: String,

    /// Font size in pixels
    #[arg(short = 's', long = "size", default_value = "16")]
    pub size: f32,

    /// Disable pair kerning
    #[arg(long = "no-kerning")]
    pub no_kerning: bool,
}
