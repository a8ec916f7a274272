// this_file: crates/typeatlas-atlas/src/packer.rs

//! Shelf packing of glyph rectangles into a square power-of-two atlas
//!
//! A guillotine-style packer: rectangles are sorted by descending height and
//! placed into a list of free regions, most recently created first. The
//! initial region is `start_width` wide and unbounded below, where
//! `start_width` targets a roughly square, ~95%-utilized result. Placement
//! either consumes a region exactly, shaves it, or splits off a remainder to
//! the right. Output positions are returned in the caller's original order.

/// Result of packing: final square side lengths and one position per input
/// rectangle, index-matched to the input.
#[derive(Debug, Clone)]
pub struct Packing {
    pub width: u32,
    pub height: u32,
    pub positions: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Copy)]
struct Region {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Pack `sizes` (width, height) into a single square texture whose side is
/// the next power of two that fits everything.
pub fn pack_shelves(sizes: &[(u32, u32)]) -> Packing {
    if sizes.is_empty() {
        return Packing {
            width: 0,
            height: 0,
            positions: Vec::new(),
        };
    }

    struct Slot {
        id: usize,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    }

    let mut rectangles: Vec<Slot> = sizes
        .iter()
        .enumerate()
        .map(|(id, &(width, height))| Slot {
            id,
            x: 0,
            y: 0,
            width,
            height,
        })
        .collect();

    let mut area: u64 = 0;
    let mut max_width: u32 = 0;
    for slot in &rectangles {
        area += slot.width as u64 * slot.height as u64;
        max_width = max_width.max(slot.width);
    }

    rectangles.sort_by(|a, b| b.height.cmp(&a.height));

    // Aim for a squarish container, slightly over-provisioned for sub-100%
    // space utilization.
    let start_width = ((area as f64 / 0.95).sqrt().ceil() as u32).max(max_width);

    let mut regions = vec![Region {
        x: 0,
        y: 0,
        width: start_width,
        height: u32::MAX,
    }];

    let mut width: u32 = 0;
    let mut height: u32 = 0;

    for slot in &mut rectangles {
        for i in (0..regions.len()).rev() {
            let region = regions[i];
            if slot.width > region.width || slot.height > region.height {
                continue;
            }

            slot.x = region.x;
            slot.y = region.y;
            width = width.max(slot.x + slot.width);
            height = height.max(slot.y + slot.height);

            if slot.width == region.width && slot.height == region.height {
                regions.swap_remove(i);
            } else if slot.height == region.height {
                regions[i].x += slot.width;
                regions[i].width -= slot.width;
            } else if slot.width == region.width {
                regions[i].y += slot.height;
                regions[i].height -= slot.height;
            } else {
                regions.push(Region {
                    x: region.x + slot.width,
                    y: region.y,
                    width: region.width - slot.width,
                    height: slot.height,
                });
                regions[i].y += slot.height;
                regions[i].height -= slot.height;
            }
            break;
        }
    }

    let side = ceil_pow2(width.max(height));
    rectangles.sort_by_key(|slot| slot.id);

    Packing {
        width: side,
        height: side,
        positions: rectangles.iter().map(|slot| (slot.x, slot.y)).collect(),
    }
}

fn ceil_pow2(x: u32) -> u32 {
    if x == 0 {
        0
    } else {
        x.next_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid_packing(sizes: &[(u32, u32)], packing: &Packing) {
        assert_eq!(packing.positions.len(), sizes.len());
        assert_eq!(packing.width, packing.height);
        if packing.width > 0 {
            assert!(packing.width.is_power_of_two());
        }

        for (i, (&(w, h), &(x, y))) in sizes.iter().zip(&packing.positions).enumerate() {
            assert!(
                x + w <= packing.width && y + h <= packing.height,
                "rectangle {i} sticks out: ({x},{y} {w}x{h}) in {}x{}",
                packing.width,
                packing.height
            );
        }

        for i in 0..sizes.len() {
            for j in (i + 1)..sizes.len() {
                let (wi, hi) = sizes[i];
                let (wj, hj) = sizes[j];
                let (xi, yi) = packing.positions[i];
                let (xj, yj) = packing.positions[j];
                let overlap_x = xi < xj + wj && xj < xi + wi;
                let overlap_y = yi < yj + hj && yj < yi + hi;
                assert!(
                    !(overlap_x && overlap_y),
                    "rectangles {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn empty_input() {
        let packing = pack_shelves(&[]);
        assert_eq!(packing.positions.len(), 0);
        assert_eq!(packing.width, 0);
    }

    #[test]
    fn single_rectangle() {
        let sizes = [(20, 30)];
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
        assert_eq!(packing.positions[0], (0, 0));
        assert_eq!(packing.width, 32);
    }

    #[test]
    fn uniform_grid() {
        let sizes: Vec<(u32, u32)> = (0..64).map(|_| (16, 16)).collect();
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
        // 64 * 256 px² of content fits in a 256-sided square comfortably.
        assert!(packing.width <= 256);
    }

    #[test]
    fn mixed_sizes_no_overlap() {
        let sizes: Vec<(u32, u32)> = (1..40u32)
            .map(|i| (5 + (i * 7) % 40, 5 + (i * 13) % 50))
            .collect();
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
    }

    #[test]
    fn positions_keep_input_order() {
        // Heights force a sort during packing; output must still be
        // index-for-index with the input.
        let sizes = [(10, 5), (10, 50), (10, 25)];
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
        // The tallest rectangle packs first, so it sits at the origin even
        // though it was the second input.
        assert_eq!(packing.positions[1], (0, 0));
    }

    #[test]
    fn wide_rectangle_sets_floor_width() {
        let sizes = [(300, 10), (20, 20)];
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
        assert!(packing.width >= 300);
    }

    #[test]
    fn total_area_fits() {
        let sizes: Vec<(u32, u32)> = (0..100).map(|i| (10 + i % 20, 12 + i % 15)).collect();
        let packing = pack_shelves(&sizes);
        assert_valid_packing(&sizes, &packing);
        let area: u64 = sizes.iter().map(|&(w, h)| w as u64 * h as u64).sum();
        assert!(area <= packing.width as u64 * packing.height as u64);
    }
}
