//! EAN-13, UPC-A and EAN-8.
//!
//! EAN-13 layout in runs: start guard (3), six left digits of 4 runs in L or
//! G parity, middle guard (5), six right digits in R, end guard (3), 95
//! modules in total. The parity sequence of the left half encodes the leading
//! digit. UPC-A is an EAN-13 whose leading digit is 0. EAN-8 has four digits
//! per half, all left digits in L parity, 67 modules.

use super::{best_match, modules_of, normalize, RowDecoder, Runs};
use crate::format::{DecodeHints, Symbology};
use crate::reader::Decoded;

/// L (and R) digit patterns as run widths, starting with a space.
const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// G patterns are the L patterns mirrored.
const G_PATTERNS: [[u8; 4]; 10] = [
    [1, 1, 2, 3],
    [1, 2, 2, 2],
    [2, 2, 1, 2],
    [1, 1, 4, 1],
    [2, 3, 1, 1],
    [1, 3, 2, 1],
    [4, 1, 1, 1],
    [2, 1, 3, 1],
    [3, 1, 2, 1],
    [2, 1, 1, 3],
];

/// Left-half parity per leading digit; bit 5 is the first left digit, set = G.
const FIRST_DIGIT_PARITY: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

const GUARD_RUNS: usize = 3;
const MIDDLE_RUNS: usize = 5;
const DIGIT_RUNS: usize = 4;
const DIGIT_MODULES: u32 = 7;
const MAX_DIGIT_DISTANCE: u32 = 1;

#[derive(Debug, Clone, Copy)]
struct Layout {
    half_digits: usize,
    modules: u32,
}

const EAN13: Layout = Layout {
    half_digits: 6,
    modules: 95,
};

const EAN8: Layout = Layout {
    half_digits: 4,
    modules: 67,
};

impl Layout {
    fn runs(self) -> usize {
        2 * GUARD_RUNS + MIDDLE_RUNS + 2 * self.half_digits * DIGIT_RUNS
    }
}

/// GTIN check digit over the payload digits (everything but the check digit).
pub fn check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

#[derive(Debug, Clone, Copy)]
pub struct EanReader {
    ean13: bool,
    upca: bool,
    ean8: bool,
}

impl EanReader {
    pub fn new(hints: &DecodeHints) -> Self {
        Self {
            ean13: hints.allows(Symbology::Ean13),
            upca: hints.allows(Symbology::UpcA),
            ean8: hints.allows(Symbology::Ean8),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ean13 || self.upca || self.ean8
    }

    fn decode_ean13(&self, runs: &Runs) -> Option<Decoded> {
        let digits = runs
            .bar_starts()
            .find_map(|start| read_symbol(runs, start, EAN13))?;

        let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        if digits[0] == 0 && self.upca {
            Some(Decoded::new(&text[1..], Symbology::UpcA))
        } else if self.ean13 {
            Some(Decoded::new(text, Symbology::Ean13))
        } else {
            None
        }
    }

    fn decode_ean8(&self, runs: &Runs) -> Option<Decoded> {
        let digits = runs
            .bar_starts()
            .find_map(|start| read_symbol(runs, start, EAN8))?;
        let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        Some(Decoded::new(text, Symbology::Ean8))
    }
}

impl RowDecoder for EanReader {
    fn name(&self) -> &'static str {
        "ean/upc"
    }

    fn decode_runs(&self, runs: &Runs) -> Option<Decoded> {
        if self.ean13 || self.upca {
            if let Some(decoded) = self.decode_ean13(runs) {
                return Some(decoded);
            }
        }
        if self.ean8 {
            return self.decode_ean8(runs);
        }
        None
    }
}

fn is_guard(widths: &[u32], module: f32) -> bool {
    widths.iter().all(|&w| modules_of(w, module) == 1)
}

/// Reads all digits of a symbol whose start guard begins at run `start`,
/// returning them with the check digit verified.
fn read_symbol(runs: &Runs, start: usize, layout: Layout) -> Option<Vec<u8>> {
    let widths = runs.widths();
    let end = start + layout.runs();
    if end > widths.len() {
        return None;
    }

    let symbol = &widths[start..end];
    let module = symbol.iter().sum::<u32>() as f32 / layout.modules as f32;

    let quiet_before = widths[start - 1];
    if modules_of(quiet_before, module) < GUARD_RUNS as u32 {
        return None;
    }
    if let Some(&quiet_after) = widths.get(end) {
        if modules_of(quiet_after, module) < GUARD_RUNS as u32 {
            return None;
        }
    }

    if !is_guard(&symbol[..GUARD_RUNS], module) {
        return None;
    }

    let half_runs = layout.half_digits * DIGIT_RUNS;
    let left = &symbol[GUARD_RUNS..GUARD_RUNS + half_runs];
    let middle_start = GUARD_RUNS + half_runs;
    let middle = &symbol[middle_start..middle_start + MIDDLE_RUNS];
    let right_start = middle_start + MIDDLE_RUNS;
    let right = &symbol[right_start..right_start + half_runs];
    let end_guard = &symbol[right_start + half_runs..];

    if !is_guard(middle, module) || !is_guard(end_guard, module) {
        return None;
    }

    let mut digits = Vec::with_capacity(2 * layout.half_digits + 1);
    let mut parity = 0u8;

    for chunk in left.chunks_exact(DIGIT_RUNS) {
        let pattern = normalize(chunk, DIGIT_MODULES);
        let (l_digit, l_distance) = best_match(&pattern, &L_PATTERNS)?;
        let (g_digit, g_distance) = best_match(&pattern, &G_PATTERNS)?;
        parity <<= 1;
        if l_distance <= g_distance {
            if l_distance > MAX_DIGIT_DISTANCE {
                return None;
            }
            digits.push(l_digit as u8);
        } else {
            if g_distance > MAX_DIGIT_DISTANCE {
                return None;
            }
            parity |= 1;
            digits.push(g_digit as u8);
        }
    }

    for chunk in right.chunks_exact(DIGIT_RUNS) {
        let pattern = normalize(chunk, DIGIT_MODULES);
        let (digit, distance) = best_match(&pattern, &L_PATTERNS)?;
        if distance > MAX_DIGIT_DISTANCE {
            return None;
        }
        digits.push(digit as u8);
    }

    if layout.half_digits == EAN13.half_digits {
        let first = FIRST_DIGIT_PARITY.iter().position(|&p| p == parity)? as u8;
        digits.insert(0, first);
    } else if parity != 0 {
        return None;
    }

    let (payload, check) = digits.split_at(digits.len() - 1);
    if check_digit(payload) != check[0] {
        return None;
    }

    Some(digits)
}

/// Module widths of a complete EAN-13 (13 digits) or EAN-8 (8 digits) symbol,
/// starting at the first bar of the start guard.
#[cfg(test)]
pub(crate) fn symbol_widths(digits: &str) -> Vec<u8> {
    let digits: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
    let (parity, left, right) = match digits.len() {
        13 => (FIRST_DIGIT_PARITY[digits[0] as usize], &digits[1..7], &digits[7..]),
        8 => (0, &digits[..4], &digits[4..]),
        n => panic!("unsupported digit count {}", n),
    };

    let mut widths = vec![1, 1, 1];
    for (i, &d) in left.iter().enumerate() {
        let use_g = parity & (1 << (left.len() - 1 - i)) != 0;
        let pattern = if use_g { G_PATTERNS[d as usize] } else { L_PATTERNS[d as usize] };
        widths.extend(pattern);
    }
    widths.extend([1, 1, 1, 1, 1]);
    for &d in right {
        widths.extend(L_PATTERNS[d as usize]);
    }
    widths.extend([1, 1, 1]);
    widths
}
