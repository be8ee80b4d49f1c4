use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use std::borrow::Cow;

use image::imageops::FilterType;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Images with more pixels than this are shrunk before decoding.
pub const DECODE_AREA_THRESHOLD: u64 = 160_000;

/// Row-major grid of set/clear modules as produced by a barcode writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BitMatrix {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Out-of-range coordinates read as clear.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.bits[i] = true;
        }
    }

    /// Sets a `width` x `height` rectangle, clipped to the matrix.
    pub fn set_region(&mut self, left: u32, top: u32, width: u32, height: u32) {
        let right = left.saturating_add(width).min(self.width);
        let bottom = top.saturating_add(height).min(self.height);
        for y in top..bottom {
            for x in left..right {
                let i = self.index(x, y);
                self.bits[i] = true;
            }
        }
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Rasterizes set bits as opaque black and clear bits as opaque white.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if self.get(x, y) {
                BLACK
            } else {
                WHITE
            }
        })
    }
}

/// Shrinks `image` so its area is at most [`DECODE_AREA_THRESHOLD`], keeping
/// the aspect ratio. Smaller images are returned as-is without copying.
pub fn downscale_for_decode(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let area = u64::from(width) * u64::from(height);
    if area <= DECODE_AREA_THRESHOLD {
        return Cow::Borrowed(image);
    }

    let scale = (DECODE_AREA_THRESHOLD as f64 / area as f64).sqrt();
    let scaled_width = scaled_side(width, scale);
    let scaled_height = scaled_side(height, scale);

    tracing::debug!(
        "Downscaling {}x{} to {}x{} before decoding",
        width,
        height,
        scaled_width,
        scaled_height
    );

    Cow::Owned(image.resize_exact(scaled_width, scaled_height, FilterType::Triangle))
}

// Rounded down so the scaled area stays within the threshold. The epsilon
// absorbs float error when the exact result is a whole number.
fn scaled_side(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale + 1e-9).floor() as u32).max(1)
}

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

/// Grayscale view of an RGBA image. Alpha is ignored.
pub fn luminance_source(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = rgba.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizes_set_bits_black() {
        let mut matrix = BitMatrix::new(3, 2);
        matrix.set(0, 0);
        matrix.set(2, 1);

        let image = matrix.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(*image.get_pixel(0, 0), BLACK);
        assert_eq!(*image.get_pixel(1, 0), WHITE);
        assert_eq!(*image.get_pixel(2, 1), BLACK);
        assert_eq!(*image.get_pixel(0, 1), WHITE);
    }

    #[test]
    fn set_region_is_clipped() {
        let mut matrix = BitMatrix::new(4, 4);
        matrix.set_region(2, 2, 10, 10);
        assert_eq!(matrix.count_set(), 4);
        assert!(matrix.get(3, 3));
        assert!(!matrix.get(1, 3));
        assert!(!matrix.get(9, 9));
    }

    #[test]
    fn small_images_are_not_copied() {
        let image = DynamicImage::new_rgba8(400, 400);
        let scaled = downscale_for_decode(&image);
        assert!(matches!(scaled, Cow::Borrowed(_)));
        assert_eq!((scaled.width(), scaled.height()), (400, 400));
    }

    #[test]
    fn large_images_shrink_to_threshold_area() {
        let image = DynamicImage::new_rgba8(800, 800);
        let scaled = downscale_for_decode(&image);
        assert!(matches!(scaled, Cow::Owned(_)));
        assert_eq!((scaled.width(), scaled.height()), (400, 400));

        let wide = DynamicImage::new_rgba8(1000, 500);
        let scaled = downscale_for_decode(&wide);
        assert_eq!((scaled.width(), scaled.height()), (565, 282));
    }

    #[test]
    fn images_just_over_threshold_still_shrink() {
        for (width, height) in [(399, 402), (400, 401), (160_001, 1), (1, 160_001)] {
            let image = DynamicImage::new_luma8(width, height);
            let scaled = downscale_for_decode(&image);
            let area = u64::from(scaled.width()) * u64::from(scaled.height());
            assert!(matches!(scaled, Cow::Owned(_)));
            assert!(
                area <= DECODE_AREA_THRESHOLD,
                "{}x{} scaled to {}x{}",
                width,
                height,
                scaled.width(),
                scaled.height()
            );
        }
    }

    #[test]
    fn exact_ratios_are_not_lost_to_float_error() {
        let image = DynamicImage::new_luma8(945, 945);
        let scaled = downscale_for_decode(&image);
        assert_eq!((scaled.width(), scaled.height()), (400, 400));
    }

    #[test]
    fn luminance_weights_green_highest() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));

        let mut rgba = RgbaImage::from_pixel(2, 1, WHITE);
        rgba.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let gray = luminance_source(&rgba);
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
    }
}
