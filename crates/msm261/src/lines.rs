//! Signal-line manager
//!
//! Claims the clock, word-select and data lines from the platform and owns
//! them for as long as the value lives. Dropping a [`SignalLines`] (or a
//! partially built one, when a claim fails halfway) releases every claim.

use core::fmt::{self, Write as _};

use embedded_hal::digital::PinState;
use platform::config::LINE_LABEL_PREFIX;
use platform::{Direction, LineId, LineProvider, SignalLine};

use crate::config::LinePins;
use crate::error::Error;

/// Number of physical data lines.
pub const DATA_LINE_COUNT: usize = 4;

/// Data line that carries microphone `mic`.
///
/// Seven microphones share four lines round-robin: lines 0-2 each carry two
/// microphones (0/4, 1/5, 2/6), line 3 carries microphone 3 alone.
#[must_use]
pub const fn data_line_for(mic: usize) -> usize {
    mic.wrapping_rem(DATA_LINE_COUNT)
}

/// Capacity of an exported line label.
pub const LABEL_CAPACITY: usize = 16;

// Every role this driver claims must label without truncation.
const _: () = assert!(LINE_LABEL_PREFIX.len().saturating_add("_DATA3".len()) <= LABEL_CAPACITY);

/// What a line is used for. Names the line in errors and exported labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineRole {
    /// Serial bit clock (`bck-gpios`).
    BitClock,
    /// Word select (`ws-gpios`).
    WordSelect,
    /// Data line `n` (`data-gpios[n]`).
    Data(usize),
}

impl LineRole {
    /// Label exported to the platform, e.g. `MSM261_DATA2`.
    ///
    /// Fails only for a role that does not fit [`LABEL_CAPACITY`], such as a
    /// data index far past the four physical lines.
    pub fn label(self) -> Result<heapless::String<LABEL_CAPACITY>, fmt::Error> {
        let mut label = heapless::String::new();
        write!(label, "{LINE_LABEL_PREFIX}_{self}")?;
        Ok(label)
    }
}

impl fmt::Display for LineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitClock => f.write_str("BCK"),
            Self::WordSelect => f.write_str("WS"),
            Self::Data(n) => write!(f, "DATA{n}"),
        }
    }
}

/// The full set of claimed lines.
pub struct SignalLines<L> {
    bit_clock: L,
    word_select: L,
    data: [L; DATA_LINE_COUNT],
}

impl<L: SignalLine> SignalLines<L> {
    /// Claim every line in `pins`.
    ///
    /// Clock and word select become outputs driven low; data lines become
    /// inputs. Claims are made in that order and the first failure aborts;
    /// lines claimed before it are released on return.
    pub fn acquire<P>(provider: &P, pins: &LinePins) -> Result<Self, Error>
    where
        P: LineProvider<Line = L>,
    {
        let output_low = Direction::Output(PinState::Low);
        let bit_clock = claim(provider, pins.bit_clock, LineRole::BitClock, output_low)?;
        let word_select = claim(provider, pins.word_select, LineRole::WordSelect, output_low)?;

        let [d0, d1, d2, d3] = pins.data;
        let data = [
            claim(provider, d0, LineRole::Data(0), Direction::Input)?,
            claim(provider, d1, LineRole::Data(1), Direction::Input)?,
            claim(provider, d2, LineRole::Data(2), Direction::Input)?,
            claim(provider, d3, LineRole::Data(3), Direction::Input)?,
        ];

        Ok(Self {
            bit_clock,
            word_select,
            data,
        })
    }

    /// Drive clock then word select to `level`.
    pub fn drive_clocks(&mut self, level: PinState) -> Result<(), Error> {
        write_line(&mut self.bit_clock, LineRole::BitClock, level)?;
        write_line(&mut self.word_select, LineRole::WordSelect, level)
    }

    /// Drive only the word-select line.
    pub fn drive_word_select(&mut self, level: PinState) -> Result<(), Error> {
        write_line(&mut self.word_select, LineRole::WordSelect, level)
    }

    /// Sample data line `line` directly.
    pub fn read_data(&mut self, line: usize) -> Result<PinState, Error> {
        let role = LineRole::Data(line);
        let pin = self.data.get_mut(line).ok_or(Error::LineIo { role })?;
        pin.read().map_err(|_| line_io(role))
    }

    /// Sample the data line backing microphone `mic`.
    pub fn read_mic(&mut self, mic: usize) -> Result<PinState, Error> {
        self.read_data(data_line_for(mic))
    }
}

fn claim<P: LineProvider>(
    provider: &P,
    id: LineId,
    role: LineRole,
    direction: Direction,
) -> Result<P::Line, Error> {
    let label = role.label().map_err(|_| {
        error!("label for {} line exceeds {} bytes", role, LABEL_CAPACITY);
        Error::InvalidConfig
    })?;
    let mut line = provider.acquire(id, &label).map_err(|_| {
        error!("failed to request {} line (gpio {})", role, id.get());
        Error::LineUnavailable { role }
    })?;
    line.set_direction(direction).map_err(|_| line_io(role))?;
    Ok(line)
}

fn write_line<L: SignalLine>(line: &mut L, role: LineRole, level: PinState) -> Result<(), Error> {
    line.write(level).map_err(|_| line_io(role))
}

fn line_io(role: LineRole) -> Error {
    error!("I/O failure on {} line", role);
    Error::LineIo { role }
}
