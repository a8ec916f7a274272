//! `typeatlas info` - inspect a font's tables and metrics

use anyhow::Context;

use typeatlas_text::KerningTable;
use typeatlas_ttf::{parse_ttf, ParseSettings};

use crate::cli::InfoArgs;

pub fn run(args: &InfoArgs, debug: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.font)
        .with_context(|| format!("reading {}", args.font.display()))?;
    let font = parse_ttf(&data, &ParseSettings { debug })
        .with_context(|| format!("parsing {}", args.font.display()))?;

    println!("{}", args.font.display());
    println!("  {} bytes, {} tables", data.len(), font.tables.len());

    let mut tags: Vec<String> = font
        .tables
        .keys()
        .map(|tag| String::from_utf8_lossy(tag).into_owned())
        .collect();
    tags.sort();
    println!("  tables: {}", tags.join(" "));

    println!("  units/em: {}", font.head.units_per_em);
    println!(
        "  glyphs: {} ({} mapped code points)",
        font.maxp.num_glyphs,
        font.cmap.glyph_index_map.len()
    );
    println!(
        "  ascender {} / descender {} / line gap {}",
        font.hhea.ascender, font.hhea.descender, font.hhea.line_gap
    );
    println!(
        "  hMetrics: {} explicit, {} trailing bearings",
        font.hmtx.h_metrics.len(),
        font.hmtx.left_side_bearings.len()
    );

    let kerning = KerningTable::from_gpos(font.gpos.as_ref());
    if kerning.is_empty() {
        println!("  kerning: none");
    } else {
        println!("  kerning: {} source(s)", kerning.source_count());
    }

    if !font.diagnostics.is_empty() {
        println!("  skipped features:");
        for diagnostic in &font.diagnostics {
            println!("    - {diagnostic}");
        }
    }

    Ok(())
}
