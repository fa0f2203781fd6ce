//! Clock planner
//!
//! The bit-clock target for each operating mode is fixed (it does not follow
//! the sample rate); requested frequencies are checked against the mode's
//! inclusive range.
//!
//! | Mode      | Range               | Target       |
//! |-----------|---------------------|--------------|
//! | normal    | 1 000 000-4 000 000 | 2 048 000 Hz |
//! | low power | 150 000-800 000     | 400 000 Hz   |

use platform::BitClockHz;

use crate::error::Error;
use crate::mode::OperatingMode;

/// Inclusive bit-clock range in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRange {
    /// Lowest accepted frequency.
    pub min: u32,
    /// Highest accepted frequency.
    pub max: u32,
}

impl ClockRange {
    /// `true` if `hz` lies within the range, bounds included.
    #[must_use]
    pub const fn contains(self, hz: u32) -> bool {
        hz >= self.min && hz <= self.max
    }
}

/// Normal-mode range.
pub const NORMAL_RANGE: ClockRange = ClockRange {
    min: 1_000_000,
    max: 4_000_000,
};

/// Low-power range.
pub const LOW_POWER_RANGE: ClockRange = ClockRange {
    min: 150_000,
    max: 800_000,
};

/// Normal-mode target.
pub const NORMAL_TARGET: BitClockHz = BitClockHz::new(2_048_000);

/// Low-power target.
pub const LOW_POWER_TARGET: BitClockHz = BitClockHz::new(400_000);

/// A mode together with its target and accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Mode the plan was made for.
    pub mode: OperatingMode,
    /// Fixed target frequency.
    pub target: BitClockHz,
    /// Accepted range.
    pub range: ClockRange,
}

impl ClockPlan {
    /// Plan for `mode`. Any mode other than normal plans as low power.
    #[must_use]
    pub const fn for_mode(mode: OperatingMode) -> Self {
        if mode.is_normal() {
            Self {
                mode,
                target: NORMAL_TARGET,
                range: NORMAL_RANGE,
            }
        } else {
            Self {
                mode,
                target: LOW_POWER_TARGET,
                range: LOW_POWER_RANGE,
            }
        }
    }

    /// Reject `frequency` if it falls outside this plan's range.
    pub fn validate(&self, frequency: BitClockHz) -> Result<(), Error> {
        let hz = frequency.get();
        if self.range.contains(hz) {
            Ok(())
        } else {
            Err(Error::InvalidBitClock {
                hz,
                min: self.range.min,
                max: self.range.max,
            })
        }
    }
}

/// Target frequency for `mode`.
#[must_use]
pub const fn target_frequency(mode: OperatingMode) -> BitClockHz {
    ClockPlan::for_mode(mode).target
}

/// Check `frequency` against the range for `mode`.
pub fn validate(mode: OperatingMode, frequency: BitClockHz) -> Result<(), Error> {
    ClockPlan::for_mode(mode).validate(frequency)
}

/// Records the last frequency applied.
///
/// There is no clock generator behind this: `apply` validates and stores the
/// value, nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockPlanner {
    applied: Option<BitClockHz>,
}

impl ClockPlanner {
    /// Nothing applied yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { applied: None }
    }

    /// Validate `frequency` for `mode` and record it.
    pub fn apply(&mut self, mode: OperatingMode, frequency: BitClockHz) -> Result<(), Error> {
        validate(mode, frequency)?;
        self.applied = Some(frequency);
        Ok(())
    }

    /// Last frequency passed to a successful [`apply`](Self::apply).
    #[must_use]
    pub const fn applied(&self) -> Option<BitClockHz> {
        self.applied
    }
}
