//! Hybrid binarization: local block means where there is contrast, a global
//! Otsu level where a block is flat.

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

const BLOCK_SIZE: u32 = 8;
const MIN_DIMENSION: u32 = BLOCK_SIZE * 5;
const MIN_DYNAMIC_RANGE: u8 = 24;

pub const BLACK_LEVEL: u8 = 0;
pub const WHITE_LEVEL: u8 = 255;

fn pixel(black: bool) -> Luma<u8> {
    if black {
        Luma([BLACK_LEVEL])
    } else {
        Luma([WHITE_LEVEL])
    }
}

fn dynamic_range(luma: &GrayImage) -> u8 {
    let (min, max) = luma
        .pixels()
        .fold((u8::MAX, u8::MIN), |(min, max), p| (min.min(p[0]), max.max(p[0])));
    max.saturating_sub(min)
}

/// Thresholds `luma` into pure black (0) and white (255).
pub fn hybrid_binarize(luma: &GrayImage) -> GrayImage {
    let (width, height) = luma.dimensions();

    if dynamic_range(luma) < MIN_DYNAMIC_RANGE {
        return GrayImage::from_pixel(width, height, pixel(false));
    }

    let global = otsu_level(luma);
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return GrayImage::from_fn(width, height, |x, y| pixel(luma.get_pixel(x, y)[0] <= global));
    }

    let blocks_x = width.div_ceil(BLOCK_SIZE);
    let blocks_y = height.div_ceil(BLOCK_SIZE);
    let levels = block_levels(luma, blocks_x, blocks_y, global);

    // Average each block's level over its 5x5 neighbourhood once, up front.
    let mut smoothed = vec![0u8; levels.len()];
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let (x0, x1) = (bx.saturating_sub(2), (bx + 2).min(blocks_x - 1));
            let (y0, y1) = (by.saturating_sub(2), (by + 2).min(blocks_y - 1));
            let mut sum = 0u32;
            let mut count = 0u32;
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    sum += u32::from(levels[(ny * blocks_x + nx) as usize]);
                    count += 1;
                }
            }
            smoothed[(by * blocks_x + bx) as usize] = (sum / count) as u8;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let threshold = smoothed[((y / BLOCK_SIZE) * blocks_x + x / BLOCK_SIZE) as usize];
        pixel(luma.get_pixel(x, y)[0] <= threshold)
    })
}

fn block_levels(luma: &GrayImage, blocks_x: u32, blocks_y: u32, global: u8) -> Vec<u8> {
    let (width, height) = luma.dimensions();
    let mut levels = vec![global; (blocks_x * blocks_y) as usize];

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let (mut min, mut max) = (u8::MAX, u8::MIN);
            let mut sum = 0u32;
            let mut count = 0u32;
            for y in by * BLOCK_SIZE..((by + 1) * BLOCK_SIZE).min(height) {
                for x in bx * BLOCK_SIZE..((bx + 1) * BLOCK_SIZE).min(width) {
                    let v = luma.get_pixel(x, y)[0];
                    min = min.min(v);
                    max = max.max(v);
                    sum += u32::from(v);
                    count += 1;
                }
            }
            if max - min >= MIN_DYNAMIC_RANGE {
                levels[(by * blocks_x + bx) as usize] = (sum / count) as u8;
            }
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_is_all_white() {
        for value in [0u8, 128, 255] {
            let luma = GrayImage::from_pixel(64, 64, Luma([value]));
            let binary = hybrid_binarize(&luma);
            assert!(binary.pixels().all(|p| p[0] == WHITE_LEVEL));
        }
    }

    #[test]
    fn two_tone_image_is_preserved() {
        // Vertical stripes of varying width, darker than 40 and lighter than 210.
        let luma = GrayImage::from_fn(120, 60, |x, _| {
            if (x / 3) % 3 == 0 || (x / 7) % 2 == 0 {
                Luma([30])
            } else {
                Luma([220])
            }
        });
        let binary = hybrid_binarize(&luma);
        for (x, y, p) in luma.enumerate_pixels() {
            let expected = if p[0] == 30 { BLACK_LEVEL } else { WHITE_LEVEL };
            assert_eq!(binary.get_pixel(x, y)[0], expected, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn tiny_images_use_global_level() {
        let luma = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([10]) } else { Luma([240]) });
        let binary = hybrid_binarize(&luma);
        assert_eq!(binary.get_pixel(0, 0)[0], BLACK_LEVEL);
        assert_eq!(binary.get_pixel(9, 9)[0], WHITE_LEVEL);
    }
}
