//! `typeatlas atlas` - build and export the glyph atlas

use std::fs::File;
use std::io::BufWriter;

use anyhow::Context;

use typeatlas_atlas::AtlasOptions;
use typeatlas_core::Bitmap;
use typeatlas_raster_fontdue::FontdueRasterizer;
use typeatlas_text::{load_font, LoadOptions, LookupsOptions};
use typeatlas_ttf::ParseSettings;

use crate::cli::AtlasArgs;

pub fn run(args: &AtlasArgs, debug: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.font)
        .with_context(|| format!("reading {}", args.font.display()))?;
    let rasterizer = FontdueRasterizer::from_bytes(&data)?;

    let options = LoadOptions {
        parse: ParseSettings { debug },
        lookups: LookupsOptions {
            alphabet: args.alphabet.clone(),
        },
        atlas: AtlasOptions {
            use_sdf: !args.no_sdf,
            debug_cell_backgrounds: args.debug_cells,
            ..AtlasOptions::default()
        },
    };

    let loaded = load_font(&data, &rasterizer, &options)?;
    write_png(&loaded.atlas, args)?;

    println!(
        "{}: {}x{} atlas, {} glyphs{}",
        args.output.display(),
        loaded.atlas.width,
        loaded.atlas.height,
        loaded.lookups.glyphs().len(),
        if args.no_sdf { " (raw coverage)" } else { "" }
    );

    Ok(())
}

fn write_png(bitmap: &Bitmap, args: &AtlasArgs) -> anyhow::Result<()> {
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, bitmap.width, bitmap.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header().context("writing PNG header")?;
    png_writer
        .write_image_data(&bitmap.data)
        .context("writing PNG data")?;

    Ok(())
}
