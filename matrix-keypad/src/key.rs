//! Per-key debounce/hold state machine.
//!
//! Each cell of the matrix classifies its own electrical contact reading
//! into a logical key state. Transitions happen only at scan time, driven
//! by the contact boolean for that cycle and the time elapsed since the
//! press began.

use log::trace;

use crate::gpio::Millis;

/// Logical state of one key.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    Idle,
    Pressed,
    Held,
    Released,
}

/// One cell of the key matrix: a character plus its state machine.
#[derive(Debug)]
pub(crate) struct KeyCell {
    pub(crate) ch: char,
    pub(crate) row: u8,
    pub(crate) col: u8,
    pub(crate) state: KeyState,
    /// Set when the state changed on the current scan. Consumed at most
    /// once, by `get_key`.
    pub(crate) changed: bool,
    press_start: Millis,
}

impl KeyCell {
    pub(crate) fn new(ch: char, row: u8, col: u8) -> Self {
        Self {
            ch,
            row,
            col,
            state: KeyState::Idle,
            changed: false,
            press_start: 0,
        }
    }

    /// Advance the state machine with this scan's contact reading.
    ///
    /// The hold threshold is strict: a press becomes held once the
    /// elapsed time exceeds `hold_ms`, not at exactly `hold_ms`.
    pub(crate) fn advance(&mut self, contact_closed: bool, now: Millis, hold_ms: Millis) {
        let prev = self.state;
        if contact_closed {
            match self.state {
                KeyState::Idle => {
                    self.state = KeyState::Pressed;
                    self.changed = true;
                    self.press_start = now;
                }
                KeyState::Pressed if now - self.press_start > hold_ms => {
                    self.state = KeyState::Held;
                    self.changed = true;
                }
                _ => self.changed = false,
            }
        } else {
            match self.state {
                KeyState::Pressed | KeyState::Held => {
                    self.state = KeyState::Released;
                    self.changed = true;
                }
                _ => self.changed = false,
            }
        }
        if self.state != prev {
            trace!(
                "key {} ({},{}) {:?} -> {:?}",
                self.ch,
                self.row,
                self.col,
                prev,
                self.state
            );
        }
    }

    /// Retire a released cell back to idle.
    ///
    /// Runs at the end of every scan but skips cells whose `changed` flag
    /// is still set, i.e. cells that entered the released state on this
    /// very scan. The released state therefore stays observable for
    /// exactly one scan.
    pub(crate) fn settle(&mut self) {
        if self.state == KeyState::Released && !self.changed {
            self.state = KeyState::Idle;
            self.changed = false;
        }
    }

    /// True while the key is electrically down (pressed or held).
    pub(crate) fn is_down(&self) -> bool {
        matches!(self.state, KeyState::Pressed | KeyState::Held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOLD_MS: Millis = 1000;

    fn cell() -> KeyCell {
        KeyCell::new('5', 1, 1)
    }

    /// One scan: advance with the given reading, then the settle pass.
    fn scan(cell: &mut KeyCell, closed: bool, now: Millis) {
        cell.advance(closed, now, HOLD_MS);
        cell.settle();
    }

    #[test]
    fn press_from_idle() {
        let mut c = cell();
        c.advance(true, 42, HOLD_MS);
        assert_eq!(c.state, KeyState::Pressed);
        assert!(c.changed);
        assert_eq!(c.press_start, 42);
    }

    #[test]
    fn hold_threshold_is_strict() {
        let mut c = cell();
        scan(&mut c, true, 0);
        scan(&mut c, true, HOLD_MS);
        assert_eq!(c.state, KeyState::Pressed);
        scan(&mut c, true, HOLD_MS + 1);
        assert_eq!(c.state, KeyState::Held);
        assert!(c.changed);
        // Held is entered exactly once; further scans are quiet.
        scan(&mut c, true, HOLD_MS + 500);
        assert_eq!(c.state, KeyState::Held);
        assert!(!c.changed);
    }

    #[test]
    fn release_retires_on_the_next_scan() {
        let mut c = cell();
        scan(&mut c, true, 0);
        // The scan that opens the contact leaves the cell released, even
        // after its own settle pass.
        scan(&mut c, false, 20);
        assert_eq!(c.state, KeyState::Released);
        assert!(c.changed);
        // The following scan retires it.
        scan(&mut c, false, 40);
        assert_eq!(c.state, KeyState::Idle);
        assert!(!c.changed);
    }

    #[test]
    fn release_from_held() {
        let mut c = cell();
        scan(&mut c, true, 0);
        scan(&mut c, true, HOLD_MS + 1);
        assert_eq!(c.state, KeyState::Held);
        scan(&mut c, false, HOLD_MS + 20);
        assert_eq!(c.state, KeyState::Released);
    }

    #[test]
    fn open_contact_keeps_idle() {
        let mut c = cell();
        for t in 0..10u64 {
            scan(&mut c, false, t * 10);
            assert_eq!(c.state, KeyState::Idle);
            assert!(!c.changed);
        }
    }

    proptest! {
        /// No reading sequence without contact ever activates a cell.
        #[test]
        fn no_spurious_activation(steps in prop::collection::vec(0u64..5000, 1..200)) {
            let mut c = cell();
            let mut now = 0u64;
            for dt in steps {
                now += dt;
                scan(&mut c, false, now);
                prop_assert_eq!(c.state, KeyState::Idle);
            }
        }

        /// Arbitrary contact/timing sequences only ever produce legal
        /// transitions, and the changed flag is raised exactly when the
        /// state moved.
        #[test]
        fn transitions_are_legal(steps in prop::collection::vec((any::<bool>(), 0u64..3000), 1..300)) {
            let mut c = cell();
            let mut now = 0u64;
            let mut prev = KeyState::Idle;
            for (closed, dt) in steps {
                now += dt;
                c.advance(closed, now, HOLD_MS);
                let legal = match (prev, c.state) {
                    (a, b) if a == b => true,
                    (KeyState::Idle, KeyState::Pressed) => true,
                    (KeyState::Pressed, KeyState::Held) => true,
                    (KeyState::Pressed, KeyState::Released) => true,
                    (KeyState::Held, KeyState::Released) => true,
                    _ => false,
                };
                prop_assert!(legal, "{:?} -> {:?}", prev, c.state);
                prop_assert_eq!(c.changed, c.state != prev);
                c.settle();
                prev = c.state;
            }
        }
    }
}
