//! Keypad layouts.
//!
//! A layout is a rows × cols character grid; each entry names the key at
//! that matrix cell. The two presets match the common phone-style
//! keypads. Character-keyed queries address the first matching cell in
//! scan order, so layouts with duplicate characters are only partially
//! addressable by character.

use core::fmt;

use crate::gpio::LineId;

/// Maximum number of row lines a matrix can own.
pub const MAX_ROWS: usize = 4;
/// Maximum number of column lines a matrix can own.
pub const MAX_COLS: usize = 4;
/// Maximum number of cells.
pub const MAX_KEYS: usize = MAX_ROWS * MAX_COLS;

/// Default 4×4 phone-style layout.
pub static PHONE_4X4: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Default 3×4 phone-style layout (digits only, no letter column).
pub static PHONE_3X4: [[char; 3]; 4] = [
    ['1', '2', '3'],
    ['4', '5', '6'],
    ['7', '8', '9'],
    ['*', '0', '#'],
];

/// Rejected keypad configuration.
///
/// A layout that does not match its line assignment is a programmer
/// error; it is reported at construction time instead of corrupting the
/// cell table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Layout row count differs from the number of row lines.
    RowMismatch { lines: usize, layout: usize },
    /// One layout row's length differs from the number of column lines.
    ColMismatch {
        row: usize,
        lines: usize,
        layout: usize,
    },
    /// More row lines than the driver supports.
    TooManyRows(usize),
    /// More column lines than the driver supports.
    TooManyCols(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::RowMismatch { lines, layout } => write!(
                f,
                "layout has {} rows but {} row lines were given",
                layout, lines
            ),
            ConfigError::ColMismatch { row, lines, layout } => write!(
                f,
                "layout row {} has {} keys but {} column lines were given",
                row, layout, lines
            ),
            ConfigError::TooManyRows(n) => {
                write!(f, "{} row lines exceed the supported maximum of {}", n, MAX_ROWS)
            }
            ConfigError::TooManyCols(n) => {
                write!(f, "{} column lines exceed the supported maximum of {}", n, MAX_COLS)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Check a caller-supplied layout against the line assignment.
pub(crate) fn validate(
    keymap: &[&[char]],
    rows: &[LineId],
    cols: &[LineId],
) -> Result<(), ConfigError> {
    if rows.len() > MAX_ROWS {
        return Err(ConfigError::TooManyRows(rows.len()));
    }
    if cols.len() > MAX_COLS {
        return Err(ConfigError::TooManyCols(cols.len()));
    }
    if keymap.len() != rows.len() {
        return Err(ConfigError::RowMismatch {
            lines: rows.len(),
            layout: keymap.len(),
        });
    }
    for (row, line) in keymap.iter().enumerate() {
        if line.len() != cols.len() {
            return Err(ConfigError::ColMismatch {
                row,
                lines: cols.len(),
                layout: line.len(),
            });
        }
    }
    Ok(())
}
