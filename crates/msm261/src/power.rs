//! Power-on sequencer
//!
//! ```text
//! Idle ─▶ Stabilizing ─▶ Activating(n) ─▶ Verifying(n) ─┬─▶ Success
//!                              ▲                          ├─▶ RetryActivating(n) ─▶ Activating(n+1)
//!                              └──────────────────────────┘
//!                                                         └─▶ Failed            (n == MAX_ATTEMPTS)
//! ```
//!
//! Stabilize runs once. Each attempt drives clock and word select high, waits
//! for the microphones to power up and samples every microphone's data line.
//! A retry drops both lines low and waits before activating again.
//!
//! Which microphones get sampled depends on the attempt: a non-final attempt
//! gives up at the first microphone that reads low, the final attempt checks
//! all seven so the status left behind is complete. See [`VerifyPolicy`].

use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;
use platform::SignalLine;

use crate::config::{micros, SequencerTiming};
use crate::error::Error;
use crate::lines::{data_line_for, SignalLines};
use crate::status::{MicArrayStatus, MIC_COUNT};

/// Attempts before the handshake is declared failed.
pub const MAX_ATTEMPTS: u8 = 3;

/// Handshake state. Attempts count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOnState {
    /// Not started.
    Idle,
    /// Waiting for the power rail.
    Stabilizing,
    /// Driving clocks high and waiting for power-up.
    Activating {
        /// Current attempt.
        attempt: u8,
    },
    /// Sampling data lines.
    Verifying {
        /// Current attempt.
        attempt: u8,
    },
    /// Dropping clocks before the next attempt.
    RetryActivating {
        /// Attempt that just failed.
        attempt: u8,
    },
    /// Every microphone answered.
    Success {
        /// Attempts used.
        attempts: u8,
    },
    /// Attempts exhausted.
    Failed {
        /// Attempts used.
        attempts: u8,
    },
}

/// How far verification goes after a microphone reads low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerifyPolicy {
    /// Stop at the first failing microphone; later entries keep whatever
    /// the previous attempt recorded.
    StopAtFirstFailure,
    /// Sample every microphone regardless of failures.
    CheckAll,
}

impl VerifyPolicy {
    /// Policy for attempt `attempt` (1-based).
    #[must_use]
    pub const fn for_attempt(attempt: u8) -> Self {
        if attempt >= MAX_ATTEMPTS {
            Self::CheckAll
        } else {
            Self::StopAtFirstFailure
        }
    }
}

/// Outcome of a successful handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerOnReport {
    /// Attempts used, 1..=[`MAX_ATTEMPTS`].
    pub attempts: u8,
}

/// One run of the handshake over borrowed controller state.
///
/// Built and run with the controller guard held; the borrows make the guard
/// the only way in.
pub struct PowerOnSequencer<'a, L, D> {
    lines: &'a mut SignalLines<L>,
    status: &'a mut MicArrayStatus,
    delay: &'a mut D,
    timing: SequencerTiming,
    debug: bool,
}

impl<'a, L, D> PowerOnSequencer<'a, L, D>
where
    L: SignalLine,
    D: DelayNs,
{
    /// Borrow the lines, status and delay for one run.
    pub fn new(
        lines: &'a mut SignalLines<L>,
        status: &'a mut MicArrayStatus,
        delay: &'a mut D,
        timing: SequencerTiming,
        debug: bool,
    ) -> Self {
        Self {
            lines,
            status,
            delay,
            timing,
            debug,
        }
    }

    /// Run to `Success` or `Failed`.
    ///
    /// A line I/O error aborts the run immediately. On `Failed` the status
    /// keeps the last attempt's findings and the clock lines stay high.
    pub async fn run(mut self) -> Result<PowerOnReport, Error> {
        let mut state = PowerOnState::Idle;
        loop {
            state = match state {
                PowerOnState::Idle => PowerOnState::Stabilizing,
                PowerOnState::Stabilizing => {
                    self.delay.delay_us(micros(self.timing.stabilize)).await;
                    PowerOnState::Activating { attempt: 1 }
                }
                PowerOnState::Activating { attempt } => {
                    self.lines.drive_clocks(PinState::High)?;
                    self.delay.delay_us(micros(self.timing.power_up)).await;
                    PowerOnState::Verifying { attempt }
                }
                PowerOnState::Verifying { attempt } => {
                    if self.verify(VerifyPolicy::for_attempt(attempt))? {
                        PowerOnState::Success { attempts: attempt }
                    } else if attempt >= MAX_ATTEMPTS {
                        PowerOnState::Failed { attempts: attempt }
                    } else {
                        PowerOnState::RetryActivating { attempt }
                    }
                }
                PowerOnState::RetryActivating { attempt } => {
                    if self.debug {
                        info!("power-on attempt {} failed, retrying", attempt);
                    }
                    self.lines.drive_clocks(PinState::Low)?;
                    self.delay.delay_us(micros(self.timing.retry)).await;
                    PowerOnState::Activating {
                        attempt: attempt.saturating_add(1),
                    }
                }
                PowerOnState::Success { attempts } => {
                    if self.debug {
                        info!("all microphones powered on after {} attempt(s)", attempts);
                    }
                    return Ok(PowerOnReport { attempts });
                }
                PowerOnState::Failed { attempts } => {
                    let failed = self.status.failed();
                    error!(
                        "power-on failed after {} attempts, failed mask {}",
                        attempts,
                        failed
                    );
                    return Err(Error::PowerOnFailed { attempts, failed });
                }
            };
        }
    }

    /// Sample microphones in index order. Returns `true` if all read high.
    fn verify(&mut self, policy: VerifyPolicy) -> Result<bool, Error> {
        let mut all_on = true;
        for mic in 0..MIC_COUNT {
            let responded = self.lines.read_mic(mic)? == PinState::High;
            self.status.record(mic, responded);
            if responded {
                continue;
            }
            all_on = false;
            error!(
                "microphone {} not responding on data line {}",
                mic,
                data_line_for(mic)
            );
            if policy == VerifyPolicy::StopAtFirstFailure {
                break;
            }
        }
        Ok(all_on)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::config::LinePins;
    use crate::status::PowerState;
    use platform::mocks::{SimLine, SimulatedLines};
    use platform::LineId;

    const BCK: LineId = LineId(0);
    const WS: LineId = LineId(1);
    const DATA: [LineId; 4] = [LineId(2), LineId(3), LineId(4), LineId(5)];

    fn setup() -> (SimulatedLines, SignalLines<SimLine>) {
        let sim = SimulatedLines::new();
        sim.track_attempts(BCK);
        let pins = LinePins {
            bit_clock: BCK,
            word_select: WS,
            data: DATA,
        };
        let lines = SignalLines::acquire(&sim, &pins).unwrap();
        (sim, lines)
    }

    fn all_high(sim: &SimulatedLines) {
        for id in DATA {
            sim.script_input(id, &[PinState::High]);
        }
    }

    async fn run(
        sim: &SimulatedLines,
        lines: &mut SignalLines<SimLine>,
        status: &mut MicArrayStatus,
    ) -> Result<PowerOnReport, Error> {
        let mut delay = sim.delay();
        PowerOnSequencer::new(lines, status, &mut delay, SequencerTiming::DEFAULT, true)
            .run()
            .await
    }

    #[test]
    fn test_policy_by_attempt() {
        assert_eq!(VerifyPolicy::for_attempt(1), VerifyPolicy::StopAtFirstFailure);
        assert_eq!(VerifyPolicy::for_attempt(2), VerifyPolicy::StopAtFirstFailure);
        assert_eq!(VerifyPolicy::for_attempt(3), VerifyPolicy::CheckAll);
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        let mut status = MicArrayStatus::new();

        let report = run(&sim, &mut lines, &mut status).await.unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(sim.attempts(), 1);
        assert!(status.all_on());
    }

    #[tokio::test]
    async fn test_sleeps_for_clean_run() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        let mut status = MicArrayStatus::new();
        let delay = sim.delay();

        run(&sim, &mut lines, &mut status).await.unwrap();

        assert_eq!(delay.sleeps(), [(1_000_000, false), (5_000_000, false)]);
    }

    #[tokio::test]
    async fn test_non_final_attempt_stops_at_first_failure() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        // line 1 (mics 1 and 5) low on attempt 1 only
        sim.script_input(DATA[1], &[PinState::Low, PinState::High]);
        let mut status = MicArrayStatus::new();

        let report = run(&sim, &mut lines, &mut status).await.unwrap();
        assert_eq!(report.attempts, 2);

        // attempt 1 read mics 0 and 1 only, attempt 2 read all seven
        assert_eq!(sim.reads_of(DATA[0]), 1 + 2);
        assert_eq!(sim.reads_of(DATA[1]), 1 + 2);
        assert_eq!(sim.reads_of(DATA[2]), 2);
        assert_eq!(sim.reads_of(DATA[3]), 1);
    }

    #[tokio::test]
    async fn test_final_attempt_checks_all() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        sim.script_input(DATA[0], &[PinState::Low]);
        let mut status = MicArrayStatus::new();

        let err = run(&sim, &mut lines, &mut status).await.unwrap_err();

        assert_eq!(
            err,
            Error::PowerOnFailed {
                attempts: 3,
                failed: 0b001_0001
            }
        );
        assert_eq!(sim.attempts(), 3);
        // two early aborts (1 read each), then a full pass over the line's two mics
        assert_eq!(sim.reads_of(DATA[0]), 1 + 1 + 2);
        assert_eq!(sim.reads_of(DATA[3]), 1);
        assert_eq!(status.get(4).map(|m| m.power), Some(PowerState::Error));
        assert_eq!(status.get(3).map(|m| m.power), Some(PowerState::On));
    }

    #[tokio::test]
    async fn test_retry_drops_clocks_then_waits() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        sim.script_input(DATA[3], &[PinState::Low, PinState::High]);
        let mut status = MicArrayStatus::new();
        let delay = sim.delay();

        run(&sim, &mut lines, &mut status).await.unwrap();

        assert_eq!(
            sim.writes_to(BCK),
            [PinState::High, PinState::Low, PinState::High]
        );
        assert_eq!(
            sim.writes_to(WS),
            [PinState::High, PinState::Low, PinState::High]
        );
        assert_eq!(
            delay.sleeps(),
            [
                (1_000_000, false),
                (5_000_000, false),
                (1_000_000, false),
                (5_000_000, false)
            ]
        );
    }

    #[tokio::test]
    async fn test_read_fault_aborts() {
        let (sim, mut lines) = setup();
        all_high(&sim);
        sim.inject_fault(DATA[2]);
        let mut status = MicArrayStatus::new();

        let err = run(&sim, &mut lines, &mut status).await.unwrap_err();

        assert_eq!(
            err,
            Error::LineIo {
                role: crate::lines::LineRole::Data(2)
            }
        );
        assert_eq!(sim.attempts(), 1);
    }
}
