//! Device configuration
//!
//! Everything the platform collaborator resolves before the controller is
//! built: which lines to claim, whether to log informational messages, and
//! the fixed handshake delays.

use embassy_time::Duration;
use platform::LineId;

use crate::error::Error;
use crate::lines::DATA_LINE_COUNT;

/// Line numbers for every signal the array uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinePins {
    /// Bit clock (`bck-gpios`).
    pub bit_clock: LineId,
    /// Word select (`ws-gpios`).
    pub word_select: LineId,
    /// Data lines (`data-gpios`, index order).
    pub data: [LineId; DATA_LINE_COUNT],
}

impl LinePins {
    /// Reject configurations that name the same line twice.
    pub fn validate(&self) -> Result<(), Error> {
        let [d0, d1, d2, d3] = self.data;
        let ids = [self.bit_clock, self.word_select, d0, d1, d2, d3];
        let mut rest = ids.as_slice();
        while let Some((first, tail)) = rest.split_first() {
            if tail.contains(first) {
                error!("gpio {} assigned to more than one line", first.get());
                return Err(Error::InvalidConfig);
            }
            rest = tail;
        }
        Ok(())
    }
}

/// Fixed delays used during bring-up and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    /// Power-rail settle before the first activation.
    pub stabilize: Duration,
    /// Microphone power-up after clocks go high.
    pub power_up: Duration,
    /// Pause between a failed attempt and the next activation.
    pub retry: Duration,
    /// Word-select chip-enable hold when changing mode.
    pub mode_settle: Duration,
    /// I2S setup hold, spent with interrupts masked.
    pub i2s_setup: Duration,
}

impl SequencerTiming {
    /// Defaults for the MSM261S4030H0.
    pub const DEFAULT: Self = Self {
        stabilize: Duration::from_millis(1),
        power_up: Duration::from_millis(5),
        retry: Duration::from_millis(1),
        mode_settle: Duration::from_micros(10),
        i2s_setup: Duration::from_micros(1),
    };

    /// Accepted power-rail settle window.
    pub const STABILIZE_RANGE: (Duration, Duration) =
        (Duration::from_micros(1_000), Duration::from_micros(1_500));
    /// Accepted microphone power-up window.
    pub const POWER_UP_RANGE: (Duration, Duration) =
        (Duration::from_millis(5), Duration::from_millis(6));
    /// Accepted retry pause window.
    pub const RETRY_RANGE: (Duration, Duration) =
        (Duration::from_micros(1_000), Duration::from_micros(1_500));
    /// Accepted mode-settle window.
    pub const MODE_SETTLE_RANGE: (Duration, Duration) =
        (Duration::from_micros(10), Duration::from_micros(15));
    /// Accepted I2S setup window. Spent with interrupts masked, so it stays
    /// in single microseconds.
    pub const I2S_SETUP_RANGE: (Duration, Duration) =
        (Duration::from_micros(1), Duration::from_micros(2));

    /// Reject delays outside the windows the part is specified for.
    pub fn validate(&self) -> Result<(), Error> {
        check_window("stabilize", self.stabilize, Self::STABILIZE_RANGE)?;
        check_window("power-up", self.power_up, Self::POWER_UP_RANGE)?;
        check_window("retry", self.retry, Self::RETRY_RANGE)?;
        check_window("mode settle", self.mode_settle, Self::MODE_SETTLE_RANGE)?;
        check_window("I2S setup", self.i2s_setup, Self::I2S_SETUP_RANGE)
    }
}

fn check_window(
    name: &str,
    value: Duration,
    (min, max): (Duration, Duration),
) -> Result<(), Error> {
    if value < min || value > max {
        error!(
            "{} delay {}us outside {}-{}us",
            name,
            value.as_micros(),
            min.as_micros(),
            max.as_micros()
        );
        return Err(Error::InvalidConfig);
    }
    Ok(())
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Lines to claim.
    pub pins: LinePins,
    /// Emit informational log messages. Errors are always logged.
    pub debug: bool,
    /// Handshake delays.
    pub timing: SequencerTiming,
}

impl DeviceConfig {
    /// Configuration with default timing and informational logging off.
    #[must_use]
    pub const fn new(pins: LinePins) -> Self {
        Self {
            pins,
            debug: false,
            timing: SequencerTiming::DEFAULT,
        }
    }

    /// Turn informational logging on or off.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replace the handshake delays. Checked by [`validate`](Self::validate).
    #[must_use]
    pub const fn with_timing(mut self, timing: SequencerTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        self.pins.validate()?;
        self.timing.validate()
    }
}

/// `duration` in whole microseconds, saturating at `u32::MAX`.
pub(crate) fn micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins() -> LinePins {
        LinePins {
            bit_clock: LineId(5),
            word_select: LineId(6),
            data: [LineId(7), LineId(8), LineId(9), LineId(10)],
        }
    }

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::new(pins());
        assert!(!config.debug);
        assert_eq!(config.timing.stabilize, Duration::from_millis(1));
        assert_eq!(config.timing.power_up, Duration::from_millis(5));
        assert_eq!(config.timing.retry, Duration::from_millis(1));
        assert_eq!(config.timing.mode_settle, Duration::from_micros(10));
        assert_eq!(config.timing.i2s_setup, Duration::from_micros(1));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_data_line_rejected() {
        let mut p = pins();
        p.data = [LineId(7), LineId(8), LineId(7), LineId(10)];
        assert_eq!(p.validate(), Err(Error::InvalidConfig));
    }

    #[test]
    fn test_clock_shared_with_data_rejected() {
        let mut p = pins();
        p.bit_clock = LineId(10);
        assert_eq!(DeviceConfig::new(p).validate(), Err(Error::InvalidConfig));
    }

    #[test]
    fn test_timing_window_edges_accepted() {
        let timing = SequencerTiming {
            stabilize: Duration::from_micros(1_500),
            power_up: Duration::from_millis(6),
            retry: Duration::from_micros(1_500),
            mode_settle: Duration::from_micros(15),
            i2s_setup: Duration::from_micros(2),
        };
        assert_eq!(timing.validate(), Ok(()));
        assert_eq!(SequencerTiming::DEFAULT.validate(), Ok(()));
    }

    #[test]
    fn test_timing_bounds_rejected() {
        let d = SequencerTiming::DEFAULT;
        let out_of_range = [
            SequencerTiming { stabilize: Duration::from_micros(999), ..d },
            SequencerTiming { stabilize: Duration::from_micros(1_501), ..d },
            SequencerTiming { power_up: Duration::from_micros(4_999), ..d },
            SequencerTiming { power_up: Duration::from_micros(6_001), ..d },
            SequencerTiming { retry: Duration::from_micros(999), ..d },
            SequencerTiming { retry: Duration::from_micros(1_501), ..d },
            SequencerTiming { mode_settle: Duration::from_micros(9), ..d },
            SequencerTiming { mode_settle: Duration::from_micros(16), ..d },
            SequencerTiming { i2s_setup: Duration::from_ticks(0), ..d },
            SequencerTiming { i2s_setup: Duration::from_micros(3), ..d },
        ];
        for timing in out_of_range {
            assert_eq!(timing.validate(), Err(Error::InvalidConfig), "{timing:?}");
        }
    }

    #[test]
    fn test_config_rejects_masked_millisecond_hold() {
        let timing = SequencerTiming {
            stabilize: Duration::from_ticks(0),
            power_up: Duration::from_ticks(0),
            retry: Duration::from_ticks(0),
            i2s_setup: Duration::from_millis(20),
            ..SequencerTiming::DEFAULT
        };
        let config = DeviceConfig::new(pins()).with_timing(timing);
        assert_eq!(config.validate(), Err(Error::InvalidConfig));
    }

    #[test]
    fn test_micros_conversion() {
        assert_eq!(micros(Duration::from_millis(5)), 5_000);
        assert_eq!(micros(Duration::from_micros(1)), 1);
    }
}
