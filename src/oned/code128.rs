//! Code 128 with code sets A, B and C, SHIFT and FNC1.
//!
//! Every symbol is three bars and three spaces, 11 modules wide. The STOP
//! symbol's first six runs are read like any other symbol, followed by a
//! final two-module bar.

use super::{best_match, modules_of, normalize, RowDecoder, Runs};
use crate::format::Symbology;
use crate::reader::Decoded;

/// Run widths for values 0..=105 followed by the six leading runs of STOP.
const PATTERNS: [[u8; 6]; 107] = [
    [2, 1, 2, 2, 2, 2],
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2],
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1],
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3],
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3],
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1],
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1],
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2],
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2],
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1],
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1],
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
    [2, 3, 3, 1, 1, 1],
];

const SYMBOL_RUNS: usize = 6;
const SYMBOL_MODULES: u32 = 11;
const MAX_SYMBOL_DISTANCE: u32 = 1;

const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

/// FNC1 outside the first position is transmitted as ASCII GS.
const GROUP_SEPARATOR: char = '\u{1d}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn from_start(value: u8) -> Option<Self> {
        match value {
            START_A => Some(CodeSet::A),
            START_B => Some(CodeSet::B),
            START_C => Some(CodeSet::C),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Code128Reader;

impl RowDecoder for Code128Reader {
    fn name(&self) -> &'static str {
        "code128"
    }

    fn decode_runs(&self, runs: &Runs) -> Option<Decoded> {
        runs.bar_starts().find_map(|start| {
            let (start_value, values) = read_values(runs, start)?;
            let text = values_to_text(start_value, &values)?;
            Some(Decoded::new(text, Symbology::Code128))
        })
    }
}

fn read_symbol(widths: &[u32]) -> Option<u8> {
    let pattern = normalize(widths, SYMBOL_MODULES);
    let (value, distance) = best_match(&pattern, &PATTERNS)?;
    (distance <= MAX_SYMBOL_DISTANCE).then_some(value as u8)
}

/// Reads from the start symbol at run `start` through STOP. Returns the start
/// value and the data values with the checksum verified and stripped.
fn read_values(runs: &Runs, start: usize) -> Option<(u8, Vec<u8>)> {
    let widths = runs.widths();
    if start + SYMBOL_RUNS > widths.len() {
        return None;
    }

    let start_widths = &widths[start..start + SYMBOL_RUNS];
    let start_pattern = normalize(start_widths, SYMBOL_MODULES);
    let start_value = (START_A..=START_C).find(|&v| PATTERNS[v as usize][..] == start_pattern[..])?;

    let module = start_widths.iter().sum::<u32>() as f32 / SYMBOL_MODULES as f32;
    if modules_of(widths[start - 1], module) < 5 {
        return None;
    }

    let mut values = Vec::new();
    let mut pos = start + SYMBOL_RUNS;
    loop {
        if pos + SYMBOL_RUNS > widths.len() {
            return None;
        }
        let value = read_symbol(&widths[pos..pos + SYMBOL_RUNS])?;
        pos += SYMBOL_RUNS;
        if value == STOP {
            break;
        }
        if value >= START_A {
            return None;
        }
        values.push(value);
    }

    // STOP ends in a two-module bar.
    let last_bar = *widths.get(pos)?;
    if !(1..=3).contains(&modules_of(last_bar, module)) {
        return None;
    }

    // At least one data symbol plus the checksum.
    if values.len() < 2 {
        return None;
    }
    let checksum = values.pop()?;
    let sum = values
        .iter()
        .enumerate()
        .fold(u32::from(start_value), |acc, (i, &v)| {
            acc + u32::from(v) * (i as u32 + 1)
        });
    if sum % 103 != u32::from(checksum) {
        return None;
    }

    Some((start_value, values))
}

fn values_to_text(start_value: u8, values: &[u8]) -> Option<String> {
    let mut set = CodeSet::from_start(start_value)?;
    let mut shifted: Option<CodeSet> = None;
    let mut text = String::new();

    for (i, &value) in values.iter().enumerate() {
        let current = shifted.take().unwrap_or(set);
        match (current, value) {
            (_, FNC1) => {
                if i > 0 {
                    text.push(GROUP_SEPARATOR);
                }
            }
            (CodeSet::A, 0..=63) => text.push(char::from(value + 32)),
            (CodeSet::A, 64..=95) => text.push(char::from(value - 64)),
            (CodeSet::B, 0..=95) => text.push(char::from(value + 32)),
            (CodeSet::C, 0..=99) => {
                text.push(char::from(b'0' + value / 10));
                text.push(char::from(b'0' + value % 10));
            }
            (CodeSet::A, SHIFT) => shifted = Some(CodeSet::B),
            (CodeSet::B, SHIFT) => shifted = Some(CodeSet::A),
            (CodeSet::A | CodeSet::B, CODE_C) => set = CodeSet::C,
            (CodeSet::A | CodeSet::C, CODE_B) => set = CodeSet::B,
            (CodeSet::B | CodeSet::C, CODE_A) => set = CodeSet::A,
            // FNC2, FNC3 and FNC4 carry no text.
            (CodeSet::A | CodeSet::B, 96 | 97) => {}
            (CodeSet::A, CODE_A) | (CodeSet::B, CODE_B) => {}
            _ => return None,
        }
    }

    Some(text)
}

/// Module widths of a Code 128 symbol for the given start and data values,
/// checksum and STOP included.
#[cfg(test)]
pub(crate) fn symbol_widths(start_value: u8, data: &[u8]) -> Vec<u8> {
    let checksum = data
        .iter()
        .enumerate()
        .fold(u32::from(start_value), |acc, (i, &v)| acc + u32::from(v) * (i as u32 + 1))
        % 103;

    let mut widths = Vec::new();
    widths.extend(PATTERNS[start_value as usize]);
    for &v in data {
        widths.extend(PATTERNS[v as usize]);
    }
    widths.extend(PATTERNS[checksum as usize]);
    widths.extend(PATTERNS[STOP as usize]);
    widths.push(2);
    widths
}

/// Data values for printable ASCII text in code set B.
#[cfg(test)]
pub(crate) fn set_b_values(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b - 32).collect()
}
