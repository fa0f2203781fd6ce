//! Operating mode and the mode configurator.

use core::fmt;

use embassy_time::Duration;
use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;
use platform::SignalLine;

use crate::config::micros;
use crate::error::Error;
use crate::lines::SignalLines;
use crate::status::MicArrayStatus;

/// Array operating mode.
///
/// Carried as the raw value the collaborator passed in. Only
/// [`OperatingMode::NORMAL`] selects the full-bandwidth clock plan; every
/// other value plans (and logs) as low power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatingMode(pub u8);

impl OperatingMode {
    /// Full-bandwidth capture, 1-4 MHz bit clock.
    pub const NORMAL: Self = Self(0);
    /// Reduced bandwidth, 150-800 kHz bit clock.
    pub const LOW_POWER: Self = Self(1);

    /// Raw mode value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// `true` only for [`OperatingMode::NORMAL`].
    #[must_use]
    pub const fn is_normal(self) -> bool {
        self.0 == Self::NORMAL.0
    }

    /// Name used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        if self.is_normal() {
            "normal"
        } else {
            "low power"
        }
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pulse word select high as a chip-enable, hold for `settle`, then record
/// `mode` on every microphone.
///
/// The caller holds the controller guard and stores the mode on the
/// controller itself.
pub(crate) async fn configure_mode<L, D>(
    lines: &mut SignalLines<L>,
    status: &mut MicArrayStatus,
    delay: &mut D,
    mode: OperatingMode,
    settle: Duration,
) -> Result<(), Error>
where
    L: SignalLine,
    D: DelayNs,
{
    lines.drive_word_select(PinState::High)?;
    delay.delay_us(micros(settle)).await;
    status.set_mode(mode);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::LinePins;
    use crate::status::MIC_COUNT;
    use platform::mocks::{LineEvent, SimulatedLines};
    use platform::LineId;

    #[test]
    fn test_unknown_mode_is_low_power() {
        assert!(OperatingMode::NORMAL.is_normal());
        assert!(!OperatingMode::LOW_POWER.is_normal());
        assert!(!OperatingMode(7).is_normal());
        assert_eq!(OperatingMode(7).name(), "low power");
        assert_eq!(OperatingMode(7).raw(), 7);
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(OperatingMode::default(), OperatingMode::NORMAL);
    }

    #[tokio::test]
    async fn test_configure_mode_pulses_word_select() {
        let sim = SimulatedLines::new();
        let pins = LinePins {
            bit_clock: LineId(0),
            word_select: LineId(1),
            data: [LineId(2), LineId(3), LineId(4), LineId(5)],
        };
        let mut lines = SignalLines::acquire(&sim, &pins).unwrap();
        let mut status = MicArrayStatus::new();
        let mut delay = sim.delay();
        sim.clear_events();

        configure_mode(
            &mut lines,
            &mut status,
            &mut delay,
            OperatingMode::LOW_POWER,
            Duration::from_micros(10),
        )
        .await
        .unwrap();

        assert_eq!(
            sim.events(),
            [
                LineEvent::Write {
                    id: LineId(1),
                    level: PinState::High
                },
                LineEvent::Sleep {
                    ns: 10_000,
                    blocking: false
                },
            ]
        );
        for mic in 0..MIC_COUNT {
            assert_eq!(status.get(mic).unwrap().mode, OperatingMode::LOW_POWER);
        }
    }
}
