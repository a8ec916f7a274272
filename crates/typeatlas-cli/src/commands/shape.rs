//! `typeatlas shape` - shape a string and print the glyph layout

use std::sync::Arc;

use anyhow::Context;

use typeatlas_text::{build_lookups, shape_text, LookupsOptions, ShapingOptions};
use typeatlas_ttf::{parse_ttf, ParseSettings};

use crate::cli::ShapeArgs;

pub fn run(args: &ShapeArgs, debug: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.font)
        .with_context(|| format!("reading {}", args.font.display()))?;
    let font = Arc::new(parse_ttf(&data, &ParseSettings { debug })?);

    let lookups = build_lookups(
        font,
        &LookupsOptions {
            alphabet: Some(args.text.clone()),
        },
    )?;

    let shape = shape_text(
        &lookups,
        &args.text,
        args.size,
        &ShapingOptions {
            kerning: !args.no_kerning,
        },
    )?;

    for ((ch, position), size) in args
        .text
        .chars()
        .zip(&shape.positions)
        .zip(&shape.sizes)
    {
        println!(
            "{ch:?}  x {:>8.2}  y {:>8.2}  w {:>7.2}  h {:>7.2}",
            position.x, position.y, size.x, size.y
        );
    }
    println!(
        "bounds: {} x {}",
        shape.bounds.width, shape.bounds.height
    );

    Ok(())
}
