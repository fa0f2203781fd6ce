//! Device controller
//!
//! [`MicArray`] owns the line provider, the claimed lines and all mutable
//! device state. State sits behind one async mutex; every operation that
//! drives lines or reads status takes it, so a power-on handshake, a mode
//! change and an I2S setup never interleave and status snapshots are never
//! torn. Waiters suspend while the holder sleeps.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal::delay::DelayNs as BlockingDelayNs;
use embedded_hal_async::delay::DelayNs;
use platform::{BitClockHz, GainPercent, LineProvider};

use crate::clock::{self, ClockPlanner};
use crate::config::DeviceConfig;
use crate::error::Error;
use crate::i2s;
use crate::lines::SignalLines;
use crate::mode::{self, OperatingMode};
use crate::power::PowerOnSequencer;
use crate::status::MicArrayStatus;
use crate::stream::{StreamFormat, TriggerCommand};

struct State<L, D> {
    lines: Option<SignalLines<L>>,
    status: MicArrayStatus,
    mode: OperatingMode,
    gain: GainPercent,
    streaming: bool,
    clock: ClockPlanner,
    delay: D,
}

/// MSM261S4030H0 array controller.
///
/// - `M`: raw mutex flavour for the state guard
///   (`CriticalSectionRawMutex` when shared across interrupt priorities,
///   `NoopRawMutex` inside a single executor)
/// - `P`: platform line provider
/// - `D`: timing source; must provide both the blocking and the async
///   `DelayNs` (`embassy_time::Delay` does)
pub struct MicArray<M, P, D>
where
    M: RawMutex,
    P: LineProvider,
{
    provider: P,
    config: DeviceConfig,
    state: Mutex<M, State<P::Line, D>>,
}

impl<M, P, D> MicArray<M, P, D>
where
    M: RawMutex,
    P: LineProvider,
    D: BlockingDelayNs + DelayNs,
{
    /// Create a controller. No line is claimed until
    /// [`hardware_init`](Self::hardware_init).
    pub fn new(provider: P, config: DeviceConfig, delay: D) -> Result<Self, Error> {
        config.validate()?;

        if config.debug {
            let pins = &config.pins;
            info!(
                "MSM261 BCK gpio {}, WS gpio {}",
                pins.bit_clock.get(),
                pins.word_select.get()
            );
            for (n, id) in pins.data.iter().enumerate() {
                info!("MSM261 DATA{} gpio {}", n, id.get());
            }
        }

        Ok(Self {
            provider,
            config,
            state: Mutex::new(State {
                lines: None,
                status: MicArrayStatus::new(),
                mode: OperatingMode::NORMAL,
                gain: GainPercent::DEFAULT,
                streaming: false,
                clock: ClockPlanner::new(),
                delay,
            }),
        })
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Bring the array up.
    ///
    /// 1. reset all microphone status
    /// 2. release any lines still held, then claim clock and word select
    ///    (outputs, low) and the four data lines (inputs)
    /// 3. run the power-on handshake
    /// 4. select normal mode
    /// 5. plan, validate and apply the normal-mode bit clock
    /// 6. reset gain to 50
    /// 7. mark every microphone initialized
    ///
    /// The first failing step aborts and its error is returned unchanged.
    /// Claimed lines are kept on failure; status keeps what the failing step
    /// recorded. Safe to call again.
    pub async fn hardware_init(&self) -> Result<(), Error> {
        let debug = self.config.debug;
        let timing = self.config.timing;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if debug {
            info!("hardware initialization starting");
        }

        state.status.reset();

        state.lines = None;
        let lines = state
            .lines
            .insert(SignalLines::acquire(&self.provider, &self.config.pins)?);

        let report =
            PowerOnSequencer::new(lines, &mut state.status, &mut state.delay, timing, debug)
                .run()
                .await?;

        let mode = OperatingMode::NORMAL;
        mode::configure_mode(
            lines,
            &mut state.status,
            &mut state.delay,
            mode,
            timing.mode_settle,
        )
        .await?;
        state.mode = mode;

        state.clock.apply(mode, clock::target_frequency(mode))?;
        state.gain = GainPercent::DEFAULT;
        state.status.mark_initialized();

        if debug {
            info!(
                "hardware initialization completed after {} attempt(s)",
                report.attempts
            );
        }
        Ok(())
    }

    /// Change operating mode.
    ///
    /// Pulses word select high for the mode-settle time and records `mode`
    /// on the controller and every microphone. Any value is accepted.
    pub async fn set_mode(&self, mode: OperatingMode) -> Result<(), Error> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let lines = state.lines.as_mut().ok_or(Error::LinesNotClaimed)?;

        mode::configure_mode(
            lines,
            &mut state.status,
            &mut state.delay,
            mode,
            self.config.timing.mode_settle,
        )
        .await?;
        state.mode = mode;

        if self.config.debug {
            info!("mode set to {} ({})", mode.name(), mode.raw());
        }
        Ok(())
    }

    /// Validate and apply a bit clock / sample rate pair.
    ///
    /// The bit clock is checked against the normal-mode range whatever the
    /// current mode. On success clock and word select are driven low and
    /// held for the setup time with interrupts masked; on failure no line
    /// is touched.
    pub async fn configure_i2s(&self, bit_clock_hz: u32, sample_rate_hz: u32) -> Result<(), Error> {
        let debug = self.config.debug;
        if debug {
            info!(
                "configuring I2S: BCLK={}Hz, rate={}Hz",
                bit_clock_hz, sample_rate_hz
            );
        }

        if let Err(err) = i2s::validate_bit_clock(BitClockHz::new(bit_clock_hz)) {
            error!(
                "invalid BCLK frequency {}Hz (valid: {}-{}Hz)",
                bit_clock_hz,
                clock::NORMAL_RANGE.min,
                clock::NORMAL_RANGE.max
            );
            return Err(err);
        }

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let lines = state.lines.as_mut().ok_or(Error::LinesNotClaimed)?;
        i2s::setup_window(lines, &mut state.delay, self.config.timing.i2s_setup)?;

        if debug {
            info!("I2S configuration completed");
        }
        Ok(())
    }

    /// Apply a negotiated stream format (`rate x channels x 32` bit clock).
    pub async fn hw_params(&self, format: &StreamFormat) -> Result<(), Error> {
        let bit_clock = format.bit_clock()?;
        self.configure_i2s(bit_clock.get(), format.sample_rate.get())
            .await
    }

    /// Stream open: clear the streaming flag and bring the array up.
    pub async fn open(&self) -> Result<(), Error> {
        self.state.lock().await.streaming = false;
        if self.config.debug {
            info!("PCM opened");
        }
        self.hardware_init().await
    }

    /// Stream close. Lines stay claimed.
    pub async fn close(&self) {
        self.state.lock().await.streaming = false;
        if self.config.debug {
            info!("PCM closed");
        }
    }

    /// Handle a raw trigger code from the audio framework.
    pub async fn trigger(&self, cmd: u32) -> Result<(), Error> {
        let command = TriggerCommand::from_raw(cmd)?;
        let streaming = command.streaming();
        self.state.lock().await.streaming = streaming;
        if self.config.debug {
            if streaming {
                info!("streaming started");
            } else {
                info!("streaming stopped");
            }
        }
        Ok(())
    }

    /// Streaming flag.
    pub async fn is_streaming(&self) -> bool {
        self.state.lock().await.streaming
    }

    /// "Mic Array Gain" control value.
    pub async fn gain(&self) -> GainPercent {
        self.state.lock().await.gain
    }

    /// Store a new gain, 0-100.
    pub async fn set_gain(&self, value: u8) -> Result<(), Error> {
        let gain = GainPercent::try_new(value).map_err(|_| Error::InvalidGain(value))?;
        self.state.lock().await.gain = gain;
        Ok(())
    }

    /// Snapshot of all microphone status entries.
    pub async fn mic_status(&self) -> MicArrayStatus {
        self.state.lock().await.status
    }

    /// Current operating mode.
    pub async fn mode(&self) -> OperatingMode {
        self.state.lock().await.mode
    }

    /// Bit clock recorded by the last successful bring-up.
    pub async fn applied_bit_clock(&self) -> Option<BitClockHz> {
        self.state.lock().await.clock.applied()
    }

    /// `true` while the controller holds its lines.
    pub async fn lines_claimed(&self) -> bool {
        self.state.lock().await.lines.is_some()
    }
}
