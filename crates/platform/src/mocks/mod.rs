//! Mock implementations for testing
//!
//! This module provides a simulated line provider and a recording delay for
//! use in unit and integration tests. Both share one journal, so a test can
//! assert the exact interleaving of line writes and sleeps.

#![cfg(any(test, feature = "std"))]
// Mock bookkeeping counters; overflow is not a concern in tests.
#![allow(clippy::arithmetic_side_effects)]

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin, PinState};

use crate::gpio::{Direction, LineId, LineProvider, SignalLine};

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A line was claimed with a diagnostic label.
    Claimed {
        /// Claimed line.
        id: LineId,
        /// Exported label.
        label: String,
    },
    /// A claim was dropped.
    Released {
        /// Released line.
        id: LineId,
    },
    /// Direction changed.
    Direction {
        /// Affected line.
        id: LineId,
        /// New direction.
        direction: Direction,
    },
    /// The host drove a level.
    Write {
        /// Driven line.
        id: LineId,
        /// Driven level.
        level: PinState,
    },
    /// The host sampled a level.
    Read {
        /// Sampled line.
        id: LineId,
        /// Sampled level.
        level: PinState,
    },
    /// A delay ran to completion.
    Sleep {
        /// Requested duration in nanoseconds.
        ns: u64,
        /// `true` for a blocking (busy-wait) delay, `false` for a suspending one.
        blocking: bool,
    },
}

/// Simulated line error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Line is already claimed.
    Busy(LineId),
    /// Injected I/O fault on the line.
    Io(LineId),
}

impl embedded_hal::digital::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct LineSim {
    direction: Option<Direction>,
    level: Option<PinState>,
    script: Vec<PinState>,
}

#[derive(Default)]
struct Shared {
    lines: BTreeMap<LineId, LineSim>,
    claims: BTreeMap<LineId, String>,
    faulty: Vec<LineId>,
    attempt_line: Option<LineId>,
    attempts: usize,
    journal: Vec<LineEvent>,
}

impl Shared {
    fn drive(&mut self, id: LineId, level: PinState) {
        let line = self.lines.entry(id).or_default();
        let rising = level == PinState::High && line.level != Some(PinState::High);
        line.level = Some(level);
        if rising && self.attempt_line == Some(id) {
            self.attempts += 1;
        }
    }

    fn sample(&mut self, id: LineId) -> PinState {
        let attempts = self.attempts;
        let line = self.lines.entry(id).or_default();
        if let Some(Direction::Output(_)) = line.direction {
            return line.level.unwrap_or(PinState::Low);
        }
        let index = attempts.saturating_sub(1);
        line.script
            .get(index)
            .or_else(|| line.script.last())
            .copied()
            .unwrap_or(PinState::Low)
    }

    fn check(&self, id: LineId) -> Result<(), SimError> {
        if self.faulty.contains(&id) {
            Err(SimError::Io(id))
        } else {
            Ok(())
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated line provider.
///
/// Cloning yields another handle onto the same simulated controller, so a
/// test can keep one handle for inspection after moving another into the
/// driver under test.
///
/// Input lines read from a per-attempt script: the level sampled during
/// attempt `n` (1-based) is `script[n - 1]`, and the last entry repeats once
/// the script runs out. An attempt starts on every rising edge of the line
/// registered with [`track_attempts`](Self::track_attempts). Unscripted
/// inputs read low.
#[derive(Clone, Default)]
pub struct SimulatedLines {
    shared: Arc<Mutex<Shared>>,
}

impl SimulatedLines {
    /// Create an empty simulated controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the levels an input line reports, one entry per attempt.
    pub fn script_input(&self, id: LineId, levels: &[PinState]) {
        lock(&self.shared).lines.entry(id).or_default().script = levels.to_vec();
    }

    /// Count rising edges on `id` as attempt boundaries.
    pub fn track_attempts(&self, id: LineId) {
        let mut shared = lock(&self.shared);
        shared.attempt_line = Some(id);
        shared.attempts = 0;
    }

    /// Number of rising edges seen on the tracked line.
    pub fn attempts(&self) -> usize {
        lock(&self.shared).attempts
    }

    /// Claim `id` on behalf of some other owner.
    pub fn occupy(&self, id: LineId, label: &str) {
        lock(&self.shared).claims.insert(id, label.to_string());
    }

    /// Make every subsequent operation on `id` fail.
    pub fn inject_fault(&self, id: LineId) {
        lock(&self.shared).faulty.push(id);
    }

    /// `true` while `id` is claimed.
    pub fn is_claimed(&self, id: LineId) -> bool {
        lock(&self.shared).claims.contains_key(&id)
    }

    /// Label exported for a claimed line.
    pub fn label(&self, id: LineId) -> Option<String> {
        lock(&self.shared).claims.get(&id).cloned()
    }

    /// Last level driven on `id`.
    pub fn level(&self, id: LineId) -> Option<PinState> {
        lock(&self.shared).lines.get(&id).and_then(|line| line.level)
    }

    /// Current direction of `id`.
    pub fn direction(&self, id: LineId) -> Option<Direction> {
        lock(&self.shared).lines.get(&id).and_then(|line| line.direction)
    }

    /// Copy of the journal.
    pub fn events(&self) -> Vec<LineEvent> {
        lock(&self.shared).journal.clone()
    }

    /// Levels driven on `id`, in order.
    pub fn writes_to(&self, id: LineId) -> Vec<PinState> {
        lock(&self.shared)
            .journal
            .iter()
            .filter_map(|event| match event {
                LineEvent::Write { id: line, level } if *line == id => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Number of samples taken from `id`.
    pub fn reads_of(&self, id: LineId) -> usize {
        lock(&self.shared)
            .journal
            .iter()
            .filter(|event| matches!(event, LineEvent::Read { id: line, .. } if *line == id))
            .count()
    }

    /// Forget the journal (claims and levels are kept).
    pub fn clear_events(&self) {
        lock(&self.shared).journal.clear();
    }

    /// A delay that records into this controller's journal.
    pub fn delay(&self) -> RecordingDelay {
        RecordingDelay {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl LineProvider for SimulatedLines {
    type Line = SimLine;
    type Error = SimError;

    fn acquire(&self, id: LineId, label: &str) -> Result<SimLine, SimError> {
        let mut shared = lock(&self.shared);
        if shared.claims.contains_key(&id) {
            return Err(SimError::Busy(id));
        }
        shared.claims.insert(id, label.to_string());
        shared.journal.push(LineEvent::Claimed {
            id,
            label: label.to_string(),
        });
        Ok(SimLine {
            id,
            shared: Arc::clone(&self.shared),
        })
    }
}

/// A line claimed from [`SimulatedLines`]. Dropping it releases the claim.
pub struct SimLine {
    id: LineId,
    shared: Arc<Mutex<Shared>>,
}

impl SimLine {
    /// Line number of this claim.
    pub fn id(&self) -> LineId {
        self.id
    }
}

impl Drop for SimLine {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        shared.claims.remove(&self.id);
        shared.journal.push(LineEvent::Released { id: self.id });
    }
}

impl ErrorType for SimLine {
    type Error = SimError;
}

impl OutputPin for SimLine {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_state(PinState::High)
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_state(PinState::Low)
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        let mut shared = lock(&self.shared);
        shared.check(self.id)?;
        shared.drive(self.id, state);
        shared.journal.push(LineEvent::Write {
            id: self.id,
            level: state,
        });
        Ok(())
    }
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut shared = lock(&self.shared);
        shared.check(self.id)?;
        let level = shared.sample(self.id);
        shared.journal.push(LineEvent::Read { id: self.id, level });
        Ok(level == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl SignalLine for SimLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        let mut shared = lock(&self.shared);
        shared.check(self.id)?;
        shared.lines.entry(self.id).or_default().direction = Some(direction);
        shared.journal.push(LineEvent::Direction {
            id: self.id,
            direction,
        });
        if let Direction::Output(level) = direction {
            shared.drive(self.id, level);
        }
        Ok(())
    }
}

/// Delay that records every sleep and yields once per suspending sleep.
///
/// Implements both the blocking and the async embedded-hal `DelayNs` so a
/// driver can use it for busy-waits and suspensions alike. No wall-clock
/// time passes.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    shared: Arc<Mutex<Shared>>,
}

impl RecordingDelay {
    /// A delay with its own private journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded sleep as `(ns, blocking)`.
    pub fn sleeps(&self) -> Vec<(u64, bool)> {
        lock(&self.shared)
            .journal
            .iter()
            .filter_map(|event| match event {
                LineEvent::Sleep { ns, blocking } => Some((*ns, *blocking)),
                _ => None,
            })
            .collect()
    }

    /// Total requested sleep time in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.sleeps().iter().map(|(ns, _)| ns).sum()
    }

    fn record(&self, ns: u32, blocking: bool) {
        lock(&self.shared).journal.push(LineEvent::Sleep {
            ns: u64::from(ns),
            blocking,
        });
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.record(ns, true);
    }
}

impl embedded_hal_async::delay::DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(ns, false);
        embassy_futures::yield_now().await;
    }
}
