//! Matrix scanning and the polled query API.
//!
//! The matrix owns the GPIO collaborator, the row/column line assignment
//! and one key cell per layout entry. Queries lazily re-scan: a scan
//! drives each row active in turn and samples every column, which
//! resolves an R×C matrix with R+C lines at the cost of R row sweeps per
//! poll. A settle delay between driving a row and sampling absorbs line
//! capacitance.

use heapless::Vec;
use log::debug;

use crate::gpio::{Gpio, LineId, Millis, Polarity};
use crate::key::{KeyCell, KeyState};
use crate::layout::{self, ConfigError, MAX_COLS, MAX_KEYS, MAX_ROWS, PHONE_3X4, PHONE_4X4};

/// Default minimum time between electrical scans.
pub const DEFAULT_DEBOUNCE_MS: Millis = 10;
/// Default continuous-press duration after which a press counts as held.
pub const DEFAULT_HOLD_MS: Millis = 1000;
/// Settle time between driving a row and sampling the columns.
const SETTLE_US: u32 = 10;
/// Sleep between polls in `wait_for_key`.
const WAIT_POLL_US: u32 = 10_000;

/// A debounced matrix keypad.
///
/// Owns its GPIO lines exclusively once configured. Re-initialization is
/// wholesale: reclaim the collaborator with [`into_gpio`] and construct a
/// new matrix; all prior key state is discarded.
///
/// [`into_gpio`]: KeypadMatrix::into_gpio
pub struct KeypadMatrix<IO: Gpio> {
    io: IO,
    rows: Vec<LineId, MAX_ROWS>,
    cols: Vec<LineId, MAX_COLS>,
    /// Row-major, one cell per layout entry.
    cells: Vec<KeyCell, MAX_KEYS>,
    polarity: Polarity,
    debounce_ms: Millis,
    hold_ms: Millis,
    /// None until the first completed scan, so a fresh matrix always
    /// scans, even at `now == 0`.
    last_scan: Option<Millis>,
}

impl<IO: Gpio> KeypadMatrix<IO> {
    /// 4×4 keypad with the default phone layout
    /// (`1 2 3 A / 4 5 6 B / 7 8 9 C / * 0 # D`).
    pub fn phone_4x4(io: IO, rows: [LineId; 4], cols: [LineId; 4]) -> Self {
        let grid: [&[char]; 4] = [&PHONE_4X4[0], &PHONE_4X4[1], &PHONE_4X4[2], &PHONE_4X4[3]];
        Self::build(io, &grid, &rows, &cols)
    }

    /// 3×4 keypad with the default phone layout (digits, `*`, `#`).
    pub fn phone_3x4(io: IO, rows: [LineId; 4], cols: [LineId; 3]) -> Self {
        let grid: [&[char]; 4] = [&PHONE_3X4[0], &PHONE_3X4[1], &PHONE_3X4[2], &PHONE_3X4[3]];
        Self::build(io, &grid, &rows, &cols)
    }

    /// Custom layout. The grid shape must match the line assignment
    /// exactly: one layout row per row line, one entry per column line.
    pub fn with_layout(
        io: IO,
        keymap: &[&[char]],
        rows: &[LineId],
        cols: &[LineId],
    ) -> Result<Self, ConfigError> {
        layout::validate(keymap, rows, cols)?;
        Ok(Self::build(io, keymap, rows, cols))
    }

    // Callers have validated the shape (or it is a preset), so the
    // capacity-checked pushes cannot fail.
    fn build(io: IO, keymap: &[&[char]], rows: &[LineId], cols: &[LineId]) -> Self {
        let mut cells: Vec<KeyCell, MAX_KEYS> = Vec::new();
        for (r, line) in keymap.iter().enumerate() {
            for (c, &ch) in line.iter().enumerate() {
                cells.push(KeyCell::new(ch, r as u8, c as u8)).unwrap();
            }
        }
        let mut matrix = Self {
            io,
            rows: Vec::from_slice(rows).unwrap(),
            cols: Vec::from_slice(cols).unwrap(),
            cells,
            polarity: Polarity::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            hold_ms: DEFAULT_HOLD_MS,
            last_scan: None,
        };
        matrix.setup_lines();
        debug!(
            "keypad configured: {}x{}, debounce {}ms, hold {}ms",
            matrix.rows.len(),
            matrix.cols.len(),
            matrix.debounce_ms,
            matrix.hold_ms
        );
        matrix
    }

    /// Rest all row lines at the inactive level and pull the column lines
    /// toward it.
    fn setup_lines(&mut self) {
        let inactive = self.polarity.inactive();
        for &line in self.rows.iter() {
            self.io.drive(line, inactive);
        }
        let pull = self.polarity.column_pull();
        for &line in self.cols.iter() {
            self.io.set_pull(line, pull);
        }
    }

    /// Refresh every cell from one full row sweep.
    ///
    /// No-op when called again within the debounce interval. The guard
    /// rate-limits electrical sampling; it is not contact filtering.
    pub fn scan(&mut self) {
        let now = self.io.now();
        if let Some(last) = self.last_scan {
            if now - last < self.debounce_ms {
                return;
            }
        }

        let active = self.polarity.active();
        let inactive = self.polarity.inactive();
        let ncols = self.cols.len();

        for r in 0..self.rows.len() {
            for (i, &line) in self.rows.iter().enumerate() {
                self.io
                    .drive(line, if i == r { active } else { inactive });
            }
            self.io.delay_us(SETTLE_US);
            for c in 0..ncols {
                let closed = self.io.read(self.cols[c]) == active;
                self.cells[r * ncols + c].advance(closed, now, self.hold_ms);
            }
        }

        for &line in self.rows.iter() {
            self.io.drive(line, inactive);
        }
        for cell in self.cells.iter_mut() {
            cell.settle();
        }
        self.last_scan = Some(now);
    }

    /// First newly pressed key in scan order, if any.
    ///
    /// Consumes the cell's changed flag, so a press is reported exactly
    /// once; [`is_pressed`] keeps returning true until release.
    ///
    /// [`is_pressed`]: KeypadMatrix::is_pressed
    pub fn get_key(&mut self) -> Option<char> {
        self.scan();
        for cell in self.cells.iter_mut() {
            if cell.state == KeyState::Pressed && cell.changed {
                cell.changed = false;
                return Some(cell.ch);
            }
        }
        None
    }

    /// Whether the key with this character is currently down (pressed or
    /// held). A character that is not in the layout is never down.
    pub fn is_pressed(&mut self, ch: char) -> bool {
        self.scan();
        self.cell(ch).map_or(false, KeyCell::is_down)
    }

    /// Current state of the key with this character; idle when the
    /// character is not in the layout.
    pub fn key_state(&mut self, ch: char) -> KeyState {
        self.scan();
        self.cell(ch).map_or(KeyState::Idle, |cell| cell.state)
    }

    /// Block until a key press is reported.
    ///
    /// A spin-with-sleep loop over [`get_key`], not an event wait: the
    /// caller's own control flow is the only way out, so wrap it with a
    /// timeout if one is needed.
    ///
    /// [`get_key`]: KeypadMatrix::get_key
    pub fn wait_for_key(&mut self) -> char {
        loop {
            if let Some(ch) = self.get_key() {
                return ch;
            }
            self.io.delay_us(WAIT_POLL_US);
        }
    }

    /// Set the minimum time between scans. No retroactive effect on
    /// in-flight state.
    pub fn set_debounce_time(&mut self, ms: Millis) {
        self.debounce_ms = ms;
    }

    /// Set the continuous-press duration that reclassifies a pressed key
    /// as held. No retroactive effect on in-flight state.
    pub fn set_hold_time(&mut self, ms: Millis) {
        self.hold_ms = ms;
    }

    /// Change the electrical convention and re-run line setup. The
    /// default, active-low rows with pulled-up columns, matches the usual
    /// keypad wiring.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
        self.setup_lines();
    }

    pub fn gpio(&self) -> &IO {
        &self.io
    }

    pub fn gpio_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Reclaim the GPIO collaborator, discarding all key state.
    pub fn into_gpio(self) -> IO {
        self.io
    }

    // Duplicate characters in a layout match the first cell in scan order.
    fn cell(&self, ch: char) -> Option<&KeyCell> {
        self.cells.iter().find(|cell| cell.ch == ch)
    }
}
