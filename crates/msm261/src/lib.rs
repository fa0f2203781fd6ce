//! MSM261S4030H0 7-microphone array driver
//!
//! Bring-up and runtime configuration for the array: claims the clock,
//! word-select and data lines, powers the microphones on through a bounded
//! retry handshake, tracks per-microphone health, selects the operating mode
//! and validates the serial bit clock.
//!
//! # Components
//!
//! ```text
//! MicArray (controller, owns the guard)
//!   ├── hardware_init ─┬─ SignalLines::acquire       lines
//!   │                  ├─ PowerOnSequencer::run      power
//!   │                  ├─ configure_mode             mode
//!   │                  └─ ClockPlanner::apply        clock
//!   └── configure_i2s ─── validate + setup window    i2s
//! ```
//!
//! # Features
//!
//! - `defmt`: log through defmt (target builds)
//! - `tracing`: log through tracing (host builds)
//! - `std`: re-export the platform simulation for downstream tests
//!
//! # Example
//!
//! ```no_run
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use msm261::{DeviceConfig, LinePins, MicArray};
//! use platform::{LineId, LineProvider};
//!
//! async fn start<P: LineProvider>(gpio: P) -> Result<(), msm261::Error> {
//!     let pins = LinePins {
//!         bit_clock: LineId(18),
//!         word_select: LineId(19),
//!         data: [LineId(20), LineId(21), LineId(22), LineId(23)],
//!     };
//!     let mics: MicArray<CriticalSectionRawMutex, _, _> =
//!         MicArray::new(gpio, DeviceConfig::new(pins), embassy_time::Delay)?;
//!     mics.open().await?;
//!     mics.configure_i2s(2_048_000, 16_000).await
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // chip and pin names in doc comments
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::future_not_send)] // single-executor driver

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod i2s;
pub mod lines;
pub mod mode;
pub mod power;
pub mod status;
pub mod stream;

pub use config::{DeviceConfig, LinePins, SequencerTiming};
pub use controller::MicArray;
pub use error::{Error, ErrorKind};
pub use lines::{LineRole, DATA_LINE_COUNT};
pub use mode::OperatingMode;
pub use power::{PowerOnState, VerifyPolicy, MAX_ATTEMPTS};
pub use status::{MicArrayStatus, MicStatus, PowerState, MIC_COUNT};
pub use stream::{SampleWidth, StreamFormat, TriggerCommand};

/// Timing source on target: embassy's timer queue, usable both blocking and
/// async.
pub type DefaultDelay = embassy_time::Delay;

#[cfg(feature = "std")]
pub use platform::mocks;
