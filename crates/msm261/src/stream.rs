//! Stream formats and trigger commands as the audio framework hands them over.

use platform::{BitClockHz, SampleRateHz};

use crate::error::Error;
use crate::status::MIC_COUNT;

/// Sample container width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWidth {
    /// S16_LE
    Bits16,
    /// S24_LE
    Bits24,
    /// S32_LE
    Bits32,
}

impl SampleWidth {
    /// Width from a bit count; only 16, 24 and 32 are supported.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            16 => Some(Self::Bits16),
            24 => Some(Self::Bits24),
            32 => Some(Self::Bits32),
            _ => None,
        }
    }

    /// Bit count.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits16 => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }
}

/// A negotiated capture format.
///
/// Every channel occupies a 32-bit slot on the bus regardless of the sample
/// width, so the bit clock only depends on rate and channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamFormat {
    /// Frame rate.
    pub sample_rate: SampleRateHz,
    /// Channels, 1 to 7.
    pub channels: u8,
    /// Sample width.
    pub width: SampleWidth,
}

impl StreamFormat {
    /// Highest channel count (one per microphone).
    #[allow(clippy::cast_possible_truncation)] // 7 fits
    pub const MAX_CHANNELS: u8 = MIC_COUNT as u8;

    /// Build a format from raw negotiated values.
    pub fn new(sample_rate_hz: u32, channels: u8, sample_bits: u8) -> Result<Self, Error> {
        let sample_rate =
            SampleRateHz::new(sample_rate_hz).map_err(|_| Error::InvalidStreamFormat)?;
        let width = SampleWidth::from_bits(sample_bits).ok_or(Error::InvalidStreamFormat)?;
        if channels == 0 || channels > Self::MAX_CHANNELS {
            return Err(Error::InvalidStreamFormat);
        }
        Ok(Self {
            sample_rate,
            channels,
            width,
        })
    }

    /// `rate x channels x 32`.
    pub fn bit_clock(&self) -> Result<BitClockHz, Error> {
        BitClockHz::for_frame(self.sample_rate, self.channels).ok_or(Error::InvalidStreamFormat)
    }
}

/// Stream trigger command. Discriminants are the ALSA trigger codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum TriggerCommand {
    /// Stop capture.
    Stop = 0,
    /// Start capture.
    Start = 1,
    /// Suspend capture (system sleep).
    Suspend = 5,
    /// Resume after suspend.
    Resume = 6,
}

impl TriggerCommand {
    /// Decode a raw trigger code.
    pub const fn from_raw(cmd: u32) -> Result<Self, Error> {
        match cmd {
            0 => Ok(Self::Stop),
            1 => Ok(Self::Start),
            5 => Ok(Self::Suspend),
            6 => Ok(Self::Resume),
            other => Err(Error::InvalidTrigger(other)),
        }
    }

    /// Streaming flag after this command.
    #[must_use]
    pub const fn streaming(self) -> bool {
        matches!(self, Self::Start | Self::Resume)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bounds() {
        assert!(StreamFormat::new(48_000, 7, 32).is_ok());
        assert!(StreamFormat::new(8_000, 1, 16).is_ok());
        assert_eq!(
            StreamFormat::new(96_000, 2, 32),
            Err(Error::InvalidStreamFormat)
        );
        assert_eq!(StreamFormat::new(48_000, 0, 32), Err(Error::InvalidStreamFormat));
        assert_eq!(StreamFormat::new(48_000, 8, 32), Err(Error::InvalidStreamFormat));
        assert_eq!(StreamFormat::new(48_000, 2, 20), Err(Error::InvalidStreamFormat));
    }

    #[test]
    fn test_bit_clock_ignores_width() {
        let a = StreamFormat::new(16_000, 4, 16).unwrap();
        let b = StreamFormat::new(16_000, 4, 32).unwrap();
        assert_eq!(a.bit_clock().unwrap().get(), 2_048_000);
        assert_eq!(a.bit_clock(), b.bit_clock());
    }

    #[test]
    fn test_trigger_codes() {
        assert_eq!(TriggerCommand::from_raw(1), Ok(TriggerCommand::Start));
        assert_eq!(TriggerCommand::from_raw(6), Ok(TriggerCommand::Resume));
        assert_eq!(TriggerCommand::from_raw(0), Ok(TriggerCommand::Stop));
        assert_eq!(TriggerCommand::from_raw(5), Ok(TriggerCommand::Suspend));
        // pause push is not handled
        assert_eq!(TriggerCommand::from_raw(3), Err(Error::InvalidTrigger(3)));
        assert_eq!(TriggerCommand::Start as u32, 1);
    }

    #[test]
    fn test_trigger_streaming_flag() {
        assert!(TriggerCommand::Start.streaming());
        assert!(TriggerCommand::Resume.streaming());
        assert!(!TriggerCommand::Stop.streaming());
        assert!(!TriggerCommand::Suspend.streaming());
    }

    #[test]
    fn test_width_bits() {
        for bits in [16, 24, 32] {
            assert_eq!(SampleWidth::from_bits(bits).unwrap().bits(), bits);
        }
        assert_eq!(SampleWidth::from_bits(8), None);
    }
}
