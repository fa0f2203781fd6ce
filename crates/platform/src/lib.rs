//! Hardware Abstraction Layer (HAL) for the MSM261 microphone array
//!
//! This crate provides the narrow, trait-based interfaces the array driver
//! consumes from its platform, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Audio framework glue (out of tree)
//!         ↓
//! Array driver (msm261 crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! GPIO controller / Embassy HAL
//! ```
//!
//! # Contents
//!
//! - [`gpio`] - Line provider and claimed signal lines
//! - [`audio_types`] - Range-checked audio newtypes (gain, rates, clocks)
//! - [`config`] - Product identity constants
//! - `mocks` - Simulated line provider and recording delay (`std` feature)
//!
//! # Features
//!
//! - `std`: Enable the host-side simulation in `mocks`
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{LineId, LineProvider, SignalLine, Direction};
//! use embedded_hal::digital::InputPin;
//!
//! fn probe<P: LineProvider>(provider: &P) -> Option<bool> {
//!     let mut line = provider.acquire(LineId(17), "PROBE").ok()?;
//!     line.set_direction(Direction::Input).ok()?;
//!     line.is_high().ok()
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // pin and chip names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio_types;
pub mod config;
pub mod gpio;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export line types
pub use gpio::{Direction, LineId, LineProvider, SignalLine};

// Re-export newtypes
pub use audio_types::{BitClockHz, GainPercent, OutOfRangeError, SampleRateHz};
