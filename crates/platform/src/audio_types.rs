//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `GainPercent`: 0–100 software gain, the "Mic Array Gain" control
//! - `SampleRateHz`: validates the 8000–48000 Hz capture range
//! - `BitClockHz`: serial bit clock derived from a negotiated stream format

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── GainPercent ──────────────────────────────────────────────────────────────

/// Software gain as a percentage, 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
/// Construct with [`GainPercent::new`] (clamping) or
/// [`GainPercent::try_new`] (fallible, strict).
///
/// The gain is a stored scalar only; nothing in the driver scales samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct GainPercent(u8);

impl GainPercent {
    /// Upper bound of the control.
    pub const MAX: u8 = 100;

    /// Gain applied after every hardware initialisation.
    pub const DEFAULT: Self = Self(50);

    /// Create a `GainPercent`, clamping values above 100 to 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Create a `GainPercent`, returning an error if `value > 100`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value > 100`.
    pub fn try_new(value: u8) -> Result<Self, OutOfRangeError> {
        if value > Self::MAX {
            Err(OutOfRangeError {
                value: u32::from(value),
                min: 0,
                max: u32::from(Self::MAX),
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the inner gain value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for GainPercent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Capture sample rate in Hz, validated to the range the array supports.
///
/// Valid range: 8000–48000 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 48000 Hz.
    pub const MAX_HZ: u32 = 48_000;

    /// Create a `SampleRateHz`, returning an error if out of 8000–48000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 48000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if hz < Self::MIN_HZ || hz > Self::MAX_HZ {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

// ── BitClockHz ───────────────────────────────────────────────────────────────

/// Serial bit-clock frequency in Hz.
///
/// Not range-checked: which range applies depends on the operating mode, and
/// that decision belongs to the driver's clock planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct BitClockHz(u32);

impl BitClockHz {
    /// Bits clocked per channel slot on the TDM bus.
    pub const SLOT_BITS: u32 = 32;

    /// Wrap a raw frequency.
    #[must_use]
    pub const fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Bit clock for `channels` 32-bit slots per frame at `rate`.
    ///
    /// Returns `None` if the product overflows `u32`.
    #[must_use]
    pub fn for_frame(rate: SampleRateHz, channels: u8) -> Option<Self> {
        rate.get()
            .checked_mul(u32::from(channels))?
            .checked_mul(Self::SLOT_BITS)
            .map(Self)
    }

    /// Return the frequency in Hz.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}
