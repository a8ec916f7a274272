//! Signed distance field generation over the finished atlas
//!
//! Runs as a post-process over the whole coverage bitmap, not per glyph.
//! Alpha is thresholded into inside/outside at 128; each output pixel then
//! stores the distance to the nearest opposite pixel within the spread
//! radius, signed (inside positive) and remapped into `[0, 255]` with 128 on
//! the boundary. A fragment shader recovers crisp edges at any scale by
//! thresholding around 0.5.

use rayon::prelude::*;
use typeatlas_core::{Bitmap, PixelFormat};

const INSIDE_THRESHOLD: u8 = 128;

/// Convert the alpha channel of `bitmap` into a signed distance field with
/// the given spread `radius`. Returns a new bitmap; RGB stays white.
pub fn to_sdf(bitmap: &Bitmap, radius: u32) -> Bitmap {
    let width = bitmap.width as usize;
    let height = bitmap.height as usize;
    if width == 0 || height == 0 {
        return bitmap.clone();
    }
    let radius = radius.max(1) as i64;

    // Inside/outside mask, one bool per pixel.
    let inside: Vec<bool> = bitmap
        .data
        .chunks_exact(4)
        .map(|px| px[3] >= INSIDE_THRESHOLD)
        .collect();

    let mut out = Bitmap::new(bitmap.width, bitmap.height, PixelFormat::Rgba8);
    let row_bytes = width * 4;

    out.data
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let here = inside[y * width + x];

                // Nearest opposite pixel within the search window.
                let mut best_sq = (radius * radius) as f32;
                let mut found = false;

                let y0 = (y as i64 - radius).max(0) as usize;
                let y1 = ((y as i64 + radius) as usize).min(height - 1);
                let x0 = (x as i64 - radius).max(0) as usize;
                let x1 = ((x as i64 + radius) as usize).min(width - 1);

                for ny in y0..=y1 {
                    for nx in x0..=x1 {
                        if inside[ny * width + nx] != here {
                            let dx = nx as f32 - x as f32;
                            let dy = ny as f32 - y as f32;
                            let sq = dx * dx + dy * dy;
                            if sq < best_sq {
                                best_sq = sq;
                                found = true;
                            }
                        }
                    }
                }

                let distance = if found { best_sq.sqrt() } else { radius as f32 };
                let signed = if here { distance } else { -distance };
                let normalized = 0.5 + 0.5 * (signed / radius as f32);
                let alpha = (normalized.clamp(0.0, 1.0) * 255.0).round() as u8;

                let offset = x * 4;
                row[offset] = 255;
                row[offset + 1] = 255;
                row[offset + 2] = 255;
                row[offset + 3] = alpha;
            }
        });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_with_square(side: u32, square: (u32, u32, u32, u32)) -> Bitmap {
        let mut bmp = Bitmap::new(side, side, PixelFormat::Rgba8);
        let (sx, sy, sw, sh) = square;
        for y in sy..sy + sh {
            for x in sx..sx + sw {
                let offset = bmp.pixel_offset(x, y);
                bmp.data[offset + 3] = 255;
            }
        }
        bmp
    }

    #[test]
    fn deep_inside_saturates_high() {
        let bmp = bitmap_with_square(32, (4, 4, 24, 24));
        let sdf = to_sdf(&bmp, 4);
        // Center pixel is further than the radius from any boundary.
        let center = sdf.pixel_offset(16, 16);
        assert_eq!(sdf.data[center + 3], 255);
    }

    #[test]
    fn far_outside_saturates_low() {
        let bmp = bitmap_with_square(32, (14, 14, 4, 4));
        let sdf = to_sdf(&bmp, 4);
        let corner = sdf.pixel_offset(0, 0);
        assert_eq!(sdf.data[corner + 3], 0);
    }

    #[test]
    fn boundary_sits_near_the_midpoint() {
        let bmp = bitmap_with_square(32, (8, 8, 16, 16));
        let sdf = to_sdf(&bmp, 8);
        // Just inside the edge: distance 1, normalized 0.5 + 0.5/8.
        let just_inside = sdf.pixel_offset(8, 16);
        let expected = ((0.5 + 0.5 / 8.0) * 255.0_f32).round() as u8;
        assert_eq!(sdf.data[just_inside + 3], expected);
        // Just outside: mirrored below the midpoint.
        let just_outside = sdf.pixel_offset(7, 16);
        let expected = ((0.5 - 0.5 / 8.0) * 255.0_f32).round() as u8;
        assert_eq!(sdf.data[just_outside + 3], expected);
    }

    #[test]
    fn alpha_decreases_monotonically_away_from_ink() {
        let bmp = bitmap_with_square(32, (12, 12, 8, 8));
        let sdf = to_sdf(&bmp, 6);
        let alphas: Vec<u8> = (12..24)
            .map(|x| sdf.data[sdf.pixel_offset(x, 16) + 3])
            .collect();
        // Walking right from inside the square out past its edge.
        for pair in alphas.windows(2) {
            assert!(pair[0] >= pair[1] || pair[1] >= 128);
        }
    }

    #[test]
    fn empty_bitmap_is_all_outside() {
        let bmp = Bitmap::new(16, 16, PixelFormat::Rgba8);
        let sdf = to_sdf(&bmp, 8);
        assert!(sdf.data.chunks_exact(4).all(|px| px[3] == 0));
    }
}
