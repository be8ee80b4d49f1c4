//! Row-scanning readers for linear (1D) symbologies.
//!
//! A row of the binarized image is turned into alternating run widths; a
//! [`RowDecoder`] then looks for its symbology in those widths. Each sampled
//! row is tried left-to-right and right-to-left so upside-down codes read too.

pub mod code128;
pub mod ean;

use image::GrayImage;

use crate::binarize::BLACK_LEVEL;
use crate::error::{Result, ScanError};
use crate::format::DecodeHints;
use crate::reader::{Decoded, Reader};

const DEFAULT_SCAN_ROWS: u32 = 15;
const TRY_HARDER_ROW_STEP: u32 = 4;

/// Alternating run widths of one pixel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runs {
    first_black: bool,
    widths: Vec<u32>,
}

impl Runs {
    pub fn from_row(row: &[bool]) -> Self {
        let mut widths = Vec::new();
        let mut iter = row.iter();
        let Some(&first_black) = iter.next() else {
            return Self {
                first_black: false,
                widths,
            };
        };

        let mut current = first_black;
        let mut len = 1u32;
        for &black in iter {
            if black == current {
                len += 1;
            } else {
                widths.push(len);
                current = black;
                len = 1;
            }
        }
        widths.push(len);

        Self {
            first_black,
            widths,
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn is_black(&self, index: usize) -> bool {
        self.first_black == (index % 2 == 0)
    }

    /// Indices of bars that have a light run in front of them.
    pub fn bar_starts(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.widths.len()).filter(move |&i| self.is_black(i))
    }
}

/// Scales `widths` so they add up to `modules` and rounds each to 1..=4.
pub fn normalize(widths: &[u32], modules: u32) -> Vec<u8> {
    let total: u32 = widths.iter().sum();
    if total == 0 {
        return vec![0; widths.len()];
    }
    let unit = total as f32 / modules as f32;
    widths
        .iter()
        .map(|&w| ((w as f32 / unit).round() as u8).clamp(1, 4))
        .collect()
}

/// Width of `w` in whole modules of size `module`.
#[inline]
pub fn modules_of(w: u32, module: f32) -> u32 {
    (w as f32 / module).round() as u32
}

pub fn pattern_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| u32::from(x.abs_diff(*y)))
        .sum()
}

/// Index and distance of the closest pattern.
pub fn best_match<const N: usize>(pattern: &[u8], table: &[[u8; N]]) -> Option<(usize, u32)> {
    table
        .iter()
        .enumerate()
        .map(|(i, candidate)| (i, pattern_distance(pattern, candidate)))
        .min_by_key(|(_, distance)| *distance)
}

pub trait RowDecoder {
    fn name(&self) -> &'static str;

    fn decode_runs(&self, runs: &Runs) -> Option<Decoded>;
}

/// Adapts a [`RowDecoder`] into an image [`Reader`] by sampling rows.
pub struct LinearReader<D> {
    decoder: D,
    try_harder: bool,
}

impl<D: RowDecoder> LinearReader<D> {
    pub fn new(decoder: D, hints: &DecodeHints) -> Self {
        Self {
            decoder,
            try_harder: hints.try_harder,
        }
    }

    fn sample_rows(&self, height: u32) -> Vec<u32> {
        if height == 0 {
            return Vec::new();
        }
        let rows = if self.try_harder {
            (height / TRY_HARDER_ROW_STEP).max(1)
        } else {
            DEFAULT_SCAN_ROWS
        }
        .min(height);

        if rows == 1 {
            return vec![height / 2];
        }
        (0..rows).map(|i| i * (height - 1) / (rows - 1)).collect()
    }
}

impl<D: RowDecoder> Reader for LinearReader<D> {
    fn name(&self) -> &'static str {
        self.decoder.name()
    }

    fn decode(&self, binary: &GrayImage) -> Result<Decoded> {
        let width = binary.width();
        let mut row = Vec::with_capacity(width as usize);

        for y in self.sample_rows(binary.height()) {
            row.clear();
            row.extend((0..width).map(|x| binary.get_pixel(x, y)[0] == BLACK_LEVEL));

            if let Some(decoded) = self.decoder.decode_runs(&Runs::from_row(&row)) {
                tracing::debug!("{} decoded on row {}", self.decoder.name(), y);
                return Ok(decoded);
            }

            row.reverse();
            if let Some(decoded) = self.decoder.decode_runs(&Runs::from_row(&row)) {
                tracing::debug!("{} decoded on reversed row {}", self.decoder.name(), y);
                return Ok(decoded);
            }
        }

        Err(ScanError::NotFound)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use image::{GrayImage, Luma};

    pub const QUIET_MODULES: u32 = 12;

    /// Draws bars from module widths, starting with a bar, surrounded by
    /// quiet zones, `unit` pixels per module.
    pub fn render_widths(widths: &[u8], unit: u32, height: u32) -> GrayImage {
        let mut row = vec![255u8; (QUIET_MODULES * unit) as usize];
        let mut black = true;
        for &w in widths {
            let value = if black { 0 } else { 255 };
            row.extend(std::iter::repeat(value).take((u32::from(w) * unit) as usize));
            black = !black;
        }
        row.extend(std::iter::repeat(255u8).take((QUIET_MODULES * unit) as usize));

        let width = row.len() as u32;
        GrayImage::from_fn(width, height, |x, _| Luma([row[x as usize]]))
    }

    /// Runs of a single rendered row.
    pub fn runs_of(widths: &[u8], unit: u32) -> super::Runs {
        let image = render_widths(widths, unit, 1);
        let row: Vec<bool> = image.pixels().map(|p| p[0] == 0).collect();
        super::Runs::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_alternate_colours() {
        let row = [false, false, true, true, true, false, true];
        let runs = Runs::from_row(&row);
        assert_eq!(runs.widths(), &[2, 3, 1, 1]);
        assert!(!runs.is_black(0));
        assert!(runs.is_black(1));
        assert!(!runs.is_black(2));
        assert!(runs.is_black(3));
        assert_eq!(runs.bar_starts().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn empty_row_has_no_runs() {
        let runs = Runs::from_row(&[]);
        assert!(runs.is_empty());
        assert_eq!(runs.bar_starts().count(), 0);
    }

    #[test]
    fn normalize_rescales_to_module_count() {
        assert_eq!(normalize(&[9, 6, 3, 3], 7), vec![3, 2, 1, 1]);
        assert_eq!(normalize(&[10, 5, 4, 2], 7), vec![3, 2, 1, 1]);
        assert_eq!(normalize(&[0, 0], 7), vec![0, 0]);
    }

    #[test]
    fn best_match_picks_closest() {
        let table = [[1, 1, 1], [2, 2, 2], [3, 3, 3]];
        assert_eq!(best_match(&[2, 2, 3], &table), Some((1, 1)));
    }

    #[test]
    fn sample_rows_spread_over_height() {
        let reader = LinearReader::new(code128::Code128Reader, &DecodeHints::default());
        let rows = reader.sample_rows(100);
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0], 0);
        assert_eq!(*rows.last().unwrap(), 99);
        assert_eq!(reader.sample_rows(1), vec![0]);
        assert!(reader.sample_rows(0).is_empty());

        let hints = DecodeHints {
            try_harder: true,
            ..DecodeHints::default()
        };
        let harder = LinearReader::new(code128::Code128Reader, &hints);
        assert_eq!(harder.sample_rows(100).len(), 25);
    }
}
