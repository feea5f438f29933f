//! In-memory electrical model of a keypad matrix.
//!
//! Implements the driver's GPIO collaborator over a virtual clock, a
//! contact table and per-line driven levels. A closed contact conducts a
//! driven row level onto its column line; otherwise the column rests at
//! its pull level.

use std::collections::HashMap;

use log::trace;

use matrix_keypad::{Gpio, Level, LineId, Millis, Pull};

pub struct SimBus {
    rows: Vec<LineId>,
    cols: Vec<LineId>,
    closed: Vec<Vec<bool>>,
    driven: HashMap<LineId, Level>,
    pulls: HashMap<LineId, Pull>,
    clock_us: u64,
}

impl SimBus {
    pub fn new(rows: &[LineId], cols: &[LineId]) -> Self {
        Self {
            rows: rows.to_vec(),
            cols: cols.to_vec(),
            closed: vec![vec![false; cols.len()]; rows.len()],
            driven: HashMap::new(),
            pulls: HashMap::new(),
            clock_us: 0,
        }
    }

    pub fn press(&mut self, row: usize, col: usize) {
        trace!("contact close ({},{})", row, col);
        self.closed[row][col] = true;
    }

    pub fn release(&mut self, row: usize, col: usize) {
        trace!("contact open ({},{})", row, col);
        self.closed[row][col] = false;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.clock_us += ms * 1000;
    }

    pub fn now_ms(&self) -> Millis {
        self.clock_us / 1000
    }

    /// Rest level of an undriven line; a floating input reads high here.
    fn rest_level(&self, line: LineId) -> Level {
        match self.pulls.get(&line).copied().unwrap_or(Pull::None) {
            Pull::Up | Pull::None => Level::High,
            Pull::Down => Level::Low,
        }
    }
}

impl Gpio for SimBus {
    fn drive(&mut self, line: LineId, level: Level) {
        self.driven.insert(line, level);
    }

    fn read(&mut self, line: LineId) -> Level {
        let col = match self.cols.iter().position(|&l| l == line) {
            Some(col) => col,
            // Reading a row line just reflects what is driven onto it.
            None => return self.driven.get(&line).copied().unwrap_or(Level::High),
        };
        let rest = self.rest_level(line);
        for (row, &row_line) in self.rows.iter().enumerate() {
            if !self.closed[row][col] {
                continue;
            }
            if let Some(&level) = self.driven.get(&row_line) {
                // Only a row driven away from the rest level shows up.
                if level != rest {
                    return level;
                }
            }
        }
        rest
    }

    fn set_pull(&mut self, line: LineId, pull: Pull) {
        self.pulls.insert(line, pull);
    }

    fn now(&mut self) -> Millis {
        self.now_ms()
    }

    fn delay_us(&mut self, us: u32) {
        self.clock_us += us as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_contact_conducts_the_active_row() {
        let mut bus = SimBus::new(&[0, 1], &[4, 5]);
        bus.set_pull(4, Pull::Up);
        bus.set_pull(5, Pull::Up);
        bus.press(1, 0);

        // No row driven low yet: both columns rest high.
        bus.drive(0, Level::High);
        bus.drive(1, Level::High);
        assert_eq!(bus.read(4), Level::High);
        assert_eq!(bus.read(5), Level::High);

        // Selecting row 1 pulls only the contacted column low.
        bus.drive(1, Level::Low);
        assert_eq!(bus.read(4), Level::Low);
        assert_eq!(bus.read(5), Level::High);

        // Selecting the other row shows nothing.
        bus.drive(1, Level::High);
        bus.drive(0, Level::Low);
        assert_eq!(bus.read(4), Level::High);
    }
}
