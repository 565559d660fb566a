//! Mars time and clock pulses.
//!
//! Time is measured in millisols (1/1000 of a Martian day). A
//! [`MasterClock`] advances the simulation and hands out [`ClockPulse`]s
//! that every time-driven component consumes.

use serde::{Deserialize, Serialize};

pub const MILLISOLS_PER_SOL: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Mars time
// ---------------------------------------------------------------------------

/// A point in simulated time. Sols are numbered from 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MarsTime {
    total_millisols: f64,
}

impl MarsTime {
    /// The time `millisol` millisols into the given sol.
    pub fn new(sol: u32, millisol: f64) -> Self {
        let sol = sol.max(1);
        Self::from_millisols((sol - 1) as f64 * MILLISOLS_PER_SOL + millisol.max(0.0))
    }

    pub fn from_millisols(total: f64) -> Self {
        Self {
            total_millisols: total.max(0.0),
        }
    }

    pub fn total_millisols(self) -> f64 {
        self.total_millisols
    }

    pub fn sol(self) -> u32 {
        (self.total_millisols / MILLISOLS_PER_SOL).floor() as u32 + 1
    }

    /// Millisols elapsed since the start of the current sol, in [0, 1000).
    pub fn millisol(self) -> f64 {
        self.total_millisols.rem_euclid(MILLISOLS_PER_SOL)
    }

    #[must_use]
    pub fn plus(self, millisols: f64) -> Self {
        Self::from_millisols(self.total_millisols + millisols)
    }

    /// Signed difference `self - earlier` in millisols.
    pub fn time_diff(self, earlier: MarsTime) -> f64 {
        self.total_millisols - earlier.total_millisols
    }
}

// ---------------------------------------------------------------------------
// Clock pulse
// ---------------------------------------------------------------------------

/// One advance of the master clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockPulse {
    /// Time after the advance.
    pub time: MarsTime,
    /// Millisols covered by this pulse.
    pub elapsed: f64,
    /// The pulse crossed into a new sol.
    pub new_sol: bool,
    /// The pulse crossed at least one whole-millisol boundary.
    pub new_int_millisol: bool,
}

/// Owns the current time and produces pulses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterClock {
    time: MarsTime,
}

impl MasterClock {
    pub fn new(start: MarsTime) -> Self {
        Self { time: start }
    }

    pub fn time(&self) -> MarsTime {
        self.time
    }

    /// Advance by `millisols` (negative values are treated as zero).
    pub fn advance(&mut self, millisols: f64) -> ClockPulse {
        let elapsed = millisols.max(0.0);
        let before = self.time;
        self.time = before.plus(elapsed);
        ClockPulse {
            time: self.time,
            elapsed,
            new_sol: self.time.sol() != before.sol(),
            new_int_millisol: self.time.total_millisols().floor()
                != before.total_millisols().floor(),
        }
    }
}
