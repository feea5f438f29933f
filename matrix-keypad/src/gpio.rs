//! The GPIO collaborator consumed by the keypad core.
//!
//! The driver never touches hardware registers; everything it needs from
//! the board sits behind [`Gpio`]: drive a line, read a line, configure a
//! pull resistor, read a monotonic clock, and busy-wait for short
//! intervals. Firmware implements this against its HAL; the simulator and
//! the tests implement it in memory.

/// Identifier for one digital I/O line.
pub type LineId = u8;

/// Monotonic timestamp in milliseconds.
pub type Millis = u64;

/// Logic level on a digital line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Pull resistor configuration for an input line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Electrical convention for the selected row during a scan.
///
/// The classic wiring drives the selected row low and pulls columns up, so
/// a low column reading means contact closed. [`Polarity::ActiveLow`] is
/// the default and matches that hardware exactly.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Default for Polarity {
    fn default() -> Self {
        Polarity::ActiveLow
    }
}

impl Polarity {
    /// Drive level for the selected row.
    pub fn active(self) -> Level {
        match self {
            Polarity::ActiveLow => Level::Low,
            Polarity::ActiveHigh => Level::High,
        }
    }

    /// Drive level for unselected rows.
    pub fn inactive(self) -> Level {
        match self {
            Polarity::ActiveLow => Level::High,
            Polarity::ActiveHigh => Level::Low,
        }
    }

    /// Pull mode that rests column lines at the inactive level.
    pub fn column_pull(self) -> Pull {
        match self {
            Polarity::ActiveLow => Pull::Up,
            Polarity::ActiveHigh => Pull::Down,
        }
    }
}

/// Digital I/O and timing operations the matrix needs from the board.
///
/// The matrix takes exclusive ownership of its `Gpio` instance; no other
/// component may toggle the same lines while it is configured.
pub trait Gpio {
    /// Drive an output line to the given level.
    fn drive(&mut self, line: LineId, level: Level);

    /// Sample an input line.
    fn read(&mut self, line: LineId) -> Level;

    /// Configure the pull resistor on an input line.
    fn set_pull(&mut self, line: LineId, pull: Pull);

    /// Monotonic milliseconds since an arbitrary epoch. Must never go
    /// backwards.
    fn now(&mut self) -> Millis;

    /// Busy-wait for the given number of microseconds. Used for the
    /// settle delay between driving a row and sampling columns, and as
    /// the poll sleep in [`KeypadMatrix::wait_for_key`].
    ///
    /// [`KeypadMatrix::wait_for_key`]: crate::KeypadMatrix::wait_for_key
    fn delay_us(&mut self, us: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_levels() {
        assert_eq!(Polarity::ActiveLow.active(), Level::Low);
        assert_eq!(Polarity::ActiveLow.inactive(), Level::High);
        assert_eq!(Polarity::ActiveLow.column_pull(), Pull::Up);
        assert_eq!(Polarity::ActiveHigh.active(), Level::High);
        assert_eq!(Polarity::ActiveHigh.inactive(), Level::Low);
        assert_eq!(Polarity::ActiveHigh.column_pull(), Pull::Down);
    }
}
