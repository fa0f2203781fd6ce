//! Driver error type.

use thiserror_no_std::Error as ThisError;

use crate::lines::LineRole;

/// The three failure classes the platform collaborator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// A signal line could not be claimed (or was never claimed).
    ResourceUnavailable,
    /// A requested value is outside its accepted range.
    InvalidArgument,
    /// The hardware did not respond as required.
    IoFailure,
}

impl ErrorKind {
    /// Negative errno the platform reports for this kind
    /// (`-EBUSY`, `-EINVAL`, `-EIO`).
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::ResourceUnavailable => -16,
            Self::InvalidArgument => -22,
            Self::IoFailure => -5,
        }
    }
}

/// Errors returned by every controller operation.
///
/// Nothing is retried or swallowed beyond the power-on sequencer's bounded
/// attempt budget; each variant reaches the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The platform refused to hand over a line.
    #[error("failed to request {role} line")]
    LineUnavailable {
        /// Which line.
        role: LineRole,
    },

    /// An operation that drives lines ran before `hardware_init` claimed them.
    #[error("signal lines have not been claimed")]
    LinesNotClaimed,

    /// A claimed line failed to switch direction, drive or sample.
    #[error("I/O failure on {role} line")]
    LineIo {
        /// Which line.
        role: LineRole,
    },

    /// Bit clock outside the accepted range.
    #[error("invalid BCLK frequency {hz}Hz (valid: {min}-{max}Hz)")]
    InvalidBitClock {
        /// Requested frequency.
        hz: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// Gain above 100.
    #[error("invalid gain {0} (valid: 0-100)")]
    InvalidGain(u8),

    /// Negotiated rate, channel count or sample width not supported.
    #[error("unsupported stream format")]
    InvalidStreamFormat,

    /// Trigger command the driver does not handle.
    #[error("unsupported trigger command {0}")]
    InvalidTrigger(u32),

    /// Device configuration is inconsistent (duplicated line ids).
    #[error("invalid device configuration")]
    InvalidConfig,

    /// The power-on handshake exhausted its attempts.
    #[error("power-on failed after {attempts} attempts (failed mics {failed:#09b})")]
    PowerOnFailed {
        /// Attempts made.
        attempts: u8,
        /// Bit `i` set if microphone `i` read low on the last attempt.
        failed: u8,
    },
}

impl Error {
    /// Failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LineUnavailable { .. } | Self::LinesNotClaimed => ErrorKind::ResourceUnavailable,
            Self::InvalidBitClock { .. }
            | Self::InvalidGain(_)
            | Self::InvalidStreamFormat
            | Self::InvalidTrigger(_)
            | Self::InvalidConfig => ErrorKind::InvalidArgument,
            Self::LineIo { .. } | Self::PowerOnFailed { .. } => ErrorKind::IoFailure,
        }
    }
}
