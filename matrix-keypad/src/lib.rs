//! Debounced matrix keypad driver.
//!
//! Scans a row/column keypad wired to a handful of digital I/O lines and
//! classifies every key through a per-cell state machine
//! (idle → pressed → held → released). An R×C keypad needs only R+C
//! lines: the scan drives one row active at a time and samples all
//! columns.
//!
//! Hardware access goes through the [`Gpio`] trait, so the same core runs
//! on a microcontroller, in the bundled simulator, and under the test
//! suite. All state mutation happens synchronously inside a query call's
//! internal scan; there is no background task and no interrupt handler.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod gpio;
mod key;
pub mod layout;
mod matrix;

pub use gpio::{Gpio, Level, LineId, Millis, Polarity, Pull};
pub use key::KeyState;
pub use layout::ConfigError;
pub use matrix::{KeypadMatrix, DEFAULT_DEBOUNCE_MS, DEFAULT_HOLD_MS};
