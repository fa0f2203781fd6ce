//! Per-microphone health tracking.

use crate::mode::OperatingMode;

/// Microphones on the array.
pub const MIC_COUNT: usize = 7;

/// Power state of one microphone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Not powered (initial state, and after every reset).
    #[default]
    Off,
    /// Answered the power-on handshake.
    On,
    /// Read low during verification.
    Error,
}

/// Status of one microphone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MicStatus {
    /// Power state.
    pub power: PowerState,
    /// Mirror of the controller's operating mode.
    pub mode: OperatingMode,
    /// Set once the whole bring-up sequence completed.
    pub initialized: bool,
    /// Set when the last verification of this microphone failed.
    pub error: bool,
}

/// Status of all seven microphones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MicArrayStatus {
    mics: [MicStatus; MIC_COUNT],
}

impl MicArrayStatus {
    /// All microphones off, normal mode, uninitialized, no error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every entry in place.
    pub fn reset(&mut self) {
        self.mics = [MicStatus::default(); MIC_COUNT];
    }

    /// Status of microphone `mic`.
    #[must_use]
    pub fn get(&self, mic: usize) -> Option<&MicStatus> {
        self.mics.get(mic)
    }

    /// All entries, index order.
    #[must_use]
    pub fn mics(&self) -> &[MicStatus; MIC_COUNT] {
        &self.mics
    }

    /// Bitmask of microphones flagged in error; bit `i` is microphone `i`.
    #[must_use]
    pub fn failed(&self) -> u8 {
        self.mics
            .iter()
            .rev()
            .fold(0, |mask, mic| mask.wrapping_shl(1) | u8::from(mic.error))
    }

    /// `true` when every microphone is on without error.
    #[must_use]
    pub fn all_on(&self) -> bool {
        self.mics
            .iter()
            .all(|mic| mic.power == PowerState::On && !mic.error)
    }

    /// Record one verification result.
    pub(crate) fn record(&mut self, mic: usize, responded: bool) {
        if let Some(entry) = self.mics.get_mut(mic) {
            if responded {
                entry.power = PowerState::On;
                entry.error = false;
            } else {
                entry.power = PowerState::Error;
                entry.error = true;
            }
        }
    }

    pub(crate) fn set_mode(&mut self, mode: OperatingMode) {
        for mic in &mut self.mics {
            mic.mode = mode;
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        for mic in &mut self.mics {
            mic.initialized = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_off() {
        let status = MicArrayStatus::new();
        for mic in status.mics() {
            assert_eq!(mic.power, PowerState::Off);
            assert_eq!(mic.mode, OperatingMode::NORMAL);
            assert!(!mic.initialized);
            assert!(!mic.error);
        }
        assert_eq!(status.failed(), 0);
        assert!(!status.all_on());
    }

    #[test]
    fn test_failed_mask_bit_order() {
        let mut status = MicArrayStatus::new();
        status.record(2, false);
        status.record(6, false);
        status.record(0, true);
        assert_eq!(status.failed(), 0b100_0100);
    }

    #[test]
    fn test_record_recovers() {
        let mut status = MicArrayStatus::new();
        status.record(3, false);
        status.record(3, true);
        assert_eq!(status.get(3).map(|m| m.power), Some(PowerState::On));
        assert_eq!(status.failed(), 0);
    }

    #[test]
    fn test_record_out_of_range_is_ignored() {
        let mut status = MicArrayStatus::new();
        status.record(MIC_COUNT, false);
        assert_eq!(status, MicArrayStatus::new());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut status = MicArrayStatus::new();
        for mic in 0..MIC_COUNT {
            status.record(mic, true);
        }
        status.set_mode(OperatingMode::LOW_POWER);
        status.mark_initialized();
        assert!(status.all_on());

        status.reset();
        assert_eq!(status, MicArrayStatus::new());
    }
}
