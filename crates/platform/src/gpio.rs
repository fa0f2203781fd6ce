//! Signal-line abstraction layer
//!
//! A *line* is one physical digital pin that a driver claims by number from
//! its platform (the GPIO-controller equivalent). Claimed lines are ordinary
//! embedded-hal digital pins with a runtime direction switch on top; the
//! claim is released when the line value is dropped.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Platform line number, as resolved from the device description
/// (`bck-gpios`, `ws-gpios`, `data-gpios`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u32);

impl LineId {
    /// Return the raw line number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sampled by the host.
    Input,
    /// Driven by the host, starting at the given level.
    Output(PinState),
}

/// A claimed line.
///
/// Implementors release the claim in `Drop`, so ownership of the value is
/// ownership of the physical pin.
pub trait SignalLine: InputPin + OutputPin {
    /// Switch the line direction. `Output` drives the initial level before
    /// returning.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Drive the line to `level`.
    fn write(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.set_state(level)
    }

    /// Sample the line level.
    fn read(&mut self) -> Result<PinState, Self::Error> {
        self.is_high().map(PinState::from)
    }
}

/// Line provider
///
/// Hands out exclusive claims on platform lines. A line claimed through one
/// provider cannot be claimed again (through any provider instance sharing
/// the same controller) until the first claim is dropped.
pub trait LineProvider {
    /// Claimed line type.
    type Line: SignalLine;

    /// Error type
    type Error: core::fmt::Debug;

    /// Claim line `id`, tagging it with `label`.
    ///
    /// The label is exported to the platform for diagnostics for as long as
    /// the claim is held. Fails if the line is already claimed elsewhere.
    fn acquire(&self, id: LineId, label: &str) -> Result<Self::Line, Self::Error>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::SimulatedLines;

    #[test]
    fn test_line_id_roundtrip() {
        assert_eq!(LineId(42).get(), 42);
    }

    #[test]
    fn test_default_write_drives_level() {
        let lines = SimulatedLines::new();
        let mut line = lines.acquire(LineId(3), "T").unwrap();
        line.set_direction(Direction::Output(PinState::Low)).unwrap();
        line.write(PinState::High).unwrap();
        assert_eq!(lines.level(LineId(3)), Some(PinState::High));
        line.write(PinState::Low).unwrap();
        assert_eq!(lines.level(LineId(3)), Some(PinState::Low));
    }

    #[test]
    fn test_default_read_samples_input() {
        let lines = SimulatedLines::new();
        lines.script_input(LineId(9), &[PinState::High]);
        let mut line = lines.acquire(LineId(9), "T").unwrap();
        line.set_direction(Direction::Input).unwrap();
        assert_eq!(line.read().unwrap(), PinState::High);
    }

    #[test]
    fn test_output_direction_drives_initial_level() {
        let lines = SimulatedLines::new();
        let mut line = lines.acquire(LineId(1), "T").unwrap();
        line.set_direction(Direction::Output(PinState::High)).unwrap();
        assert_eq!(lines.level(LineId(1)), Some(PinState::High));
    }
}
