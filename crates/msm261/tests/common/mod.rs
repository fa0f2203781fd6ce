//! Shared fixtures: a simulated controller wired to a `MicArray`.
#![allow(dead_code, clippy::unwrap_used, clippy::indexing_slicing)]

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal::digital::PinState;
use msm261::{DeviceConfig, LinePins, MicArray};
use platform::mocks::{RecordingDelay, SimulatedLines};
use platform::LineId;

pub const BCK: LineId = LineId(18);
pub const WS: LineId = LineId(19);
pub const DATA: [LineId; 4] = [LineId(20), LineId(21), LineId(22), LineId(23)];
pub const ALL_LINES: [LineId; 6] = [BCK, WS, DATA[0], DATA[1], DATA[2], DATA[3]];

pub type TestArray = MicArray<NoopRawMutex, SimulatedLines, RecordingDelay>;

pub fn pins() -> LinePins {
    LinePins {
        bit_clock: BCK,
        word_select: WS,
        data: DATA,
    }
}

/// Simulated controller on which every data line reads high and each rising
/// clock edge starts a new attempt.
pub fn healthy() -> SimulatedLines {
    let sim = SimulatedLines::new();
    sim.track_attempts(BCK);
    for id in DATA {
        sim.script_input(id, &[PinState::High]);
    }
    sim
}

/// Controller over `sim`, sleeping through `sim`'s journal.
pub fn array(sim: &SimulatedLines) -> TestArray {
    init_logging();
    MicArray::new(
        sim.clone(),
        DeviceConfig::new(pins()).with_debug(true),
        sim.delay(),
    )
    .unwrap()
}

/// Route driver logs to the test writer when built with `--features tracing`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
