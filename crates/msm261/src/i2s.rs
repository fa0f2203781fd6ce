//! Runtime I2S configurator
//!
//! Validation here always uses the normal-mode range, whatever mode the
//! array is in. A low-power bit clock such as 500 kHz is rejected even when
//! the array runs in low power.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use platform::{BitClockHz, SignalLine};

use crate::clock;
use crate::config::micros;
use crate::error::Error;
use crate::lines::SignalLines;
use crate::mode::OperatingMode;

/// Check a requested bit clock before any line is touched.
pub fn validate_bit_clock(bit_clock: BitClockHz) -> Result<(), Error> {
    clock::validate(OperatingMode::NORMAL, bit_clock)
}

/// Drive clock and word select low and hold for `setup` with interrupts
/// masked.
///
/// `setup` must stay in the microsecond range: the whole window runs inside
/// one critical section on a busy-wait delay.
pub(crate) fn setup_window<L, D>(
    lines: &mut SignalLines<L>,
    delay: &mut D,
    setup: Duration,
) -> Result<(), Error>
where
    L: SignalLine,
    D: DelayNs,
{
    let hold = micros(setup);
    critical_section::with(|_cs| {
        lines.drive_clocks(PinState::Low)?;
        delay.delay_us(hold);
        Ok(())
    })
}
