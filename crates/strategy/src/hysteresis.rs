//! Two-state hysteresis machine used by the band and curvature strategies.
//!
//! The machine only changes state on an explicit trigger, so a bar whose
//! indicator sits between the entry and exit thresholds keeps the previous
//! position.

use quantbt_core::Signal;

/// What the current bar asks the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Enter,
    Exit,
    Hold,
}

impl Trigger {
    /// Maps a pair of predicates to a trigger. Entry takes precedence.
    #[must_use]
    pub const fn from_conditions(enter: bool, exit: bool) -> Self {
        if enter {
            Self::Enter
        } else if exit {
            Self::Exit
        } else {
            Self::Hold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HysteresisMachine {
    state: Signal,
}

impl HysteresisMachine {
    /// Starts flat.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Signal::Flat,
        }
    }

    #[must_use]
    pub const fn starting_at(state: Signal) -> Self {
        Self { state }
    }

    #[must_use]
    pub const fn state(&self) -> Signal {
        self.state
    }

    /// Transition table:
    ///
    /// | state | Enter | Exit | Hold |
    /// |-------|-------|------|------|
    /// | Flat  | Long  | Flat | Flat |
    /// | Long  | Long  | Flat | Long |
    #[must_use]
    pub const fn next(state: Signal, trigger: Trigger) -> Signal {
        match trigger {
            Trigger::Enter => Signal::Long,
            Trigger::Exit => Signal::Flat,
            Trigger::Hold => state,
        }
    }

    /// Applies `trigger` and returns the new state.
    pub fn step(&mut self, trigger: Trigger) -> Signal {
        self.state = Self::next(self.state, trigger);
        self.state
    }
}
