//! Line claims: labels, busy lines, release on drop and re-initialisation.
#![allow(clippy::unwrap_used)]

mod common;

use common::{array, healthy, pins, ALL_LINES, BCK, DATA, WS};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::PinState;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embassy_time::Duration;
use msm261::{DeviceConfig, Error, ErrorKind, LineRole, MicArray, PowerState, SequencerTiming};
use platform::mocks::LineEvent;
use platform::{Direction, LineId};

#[tokio::test]
async fn labels_are_exported() {
    let sim = healthy();
    let mics = array(&sim);
    mics.hardware_init().await.unwrap();

    assert_eq!(sim.label(BCK).as_deref(), Some("MSM261_BCK"));
    assert_eq!(sim.label(WS).as_deref(), Some("MSM261_WS"));
    for (n, id) in DATA.into_iter().enumerate() {
        assert_eq!(sim.label(id), Some(format!("MSM261_DATA{n}")));
    }
}

#[tokio::test]
async fn directions_after_init() {
    let sim = healthy();
    let mics = array(&sim);
    mics.hardware_init().await.unwrap();

    assert!(matches!(sim.direction(BCK), Some(Direction::Output(_))));
    assert!(matches!(sim.direction(WS), Some(Direction::Output(_))));
    for id in DATA {
        assert_eq!(sim.direction(id), Some(Direction::Input));
    }
}

/// A busy line aborts bring-up and releases whatever was already claimed.
#[tokio::test]
async fn busy_line_fails_with_resource_unavailable() {
    let sim = healthy();
    sim.occupy(WS, "spi0");
    let mics = array(&sim);

    let err = mics.hardware_init().await.unwrap_err();

    assert_eq!(
        err,
        Error::LineUnavailable {
            role: LineRole::WordSelect
        }
    );
    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    assert!(!sim.is_claimed(BCK));
    assert!(!mics.lines_claimed().await);
    assert_eq!(sim.attempts(), 0);
    let status = mics.mic_status().await;
    assert!(status.mics().iter().all(|mic| mic.power == PowerState::Off));
}

#[tokio::test]
async fn busy_data_line_names_the_line() {
    let sim = healthy();
    sim.occupy(DATA[3], "uart2");
    let mics = array(&sim);

    assert_eq!(
        mics.hardware_init().await,
        Err(Error::LineUnavailable {
            role: LineRole::Data(3)
        })
    );
}

#[tokio::test]
async fn dropping_controller_releases_lines() {
    let sim = healthy();
    let mics = array(&sim);
    mics.hardware_init().await.unwrap();
    for id in ALL_LINES {
        assert!(sim.is_claimed(id));
    }

    drop(mics);

    for id in ALL_LINES {
        assert!(!sim.is_claimed(id), "{id:?} still claimed");
    }
}

/// Lines stay claimed after a failed handshake.
#[tokio::test]
async fn lines_survive_failed_power_on() {
    let sim = healthy();
    sim.script_input(DATA[1], &[PinState::Low]);
    let mics = array(&sim);

    mics.hardware_init().await.unwrap_err();

    assert!(mics.lines_claimed().await);
    for id in ALL_LINES {
        assert!(sim.is_claimed(id));
    }
}

/// Re-init releases the old claims before making new ones.
#[tokio::test]
async fn reinit_releases_before_claiming() {
    let sim = healthy();
    let mics = array(&sim);
    mics.hardware_init().await.unwrap();
    sim.clear_events();

    mics.hardware_init().await.unwrap();

    let events = sim.events();
    let released = events
        .iter()
        .filter(|e| matches!(e, LineEvent::Released { .. }))
        .count();
    let first_claim = events
        .iter()
        .position(|e| matches!(e, LineEvent::Claimed { .. }))
        .unwrap();
    let last_release = events
        .iter()
        .rposition(|e| matches!(e, LineEvent::Released { .. }))
        .unwrap();
    assert_eq!(released, ALL_LINES.len());
    assert!(last_release < first_claim);
}

#[test]
fn duplicate_pins_are_rejected() {
    let mut p = pins();
    p.word_select = DATA[0];
    let result = MicArray::<CriticalSectionRawMutex, _, _>::new(
        healthy(),
        DeviceConfig::new(p),
        NoopDelay::new(),
    );
    assert_eq!(result.err(), Some(Error::InvalidConfig));
}

/// A setup hold that would mask interrupts for milliseconds never reaches
/// the hardware: construction fails and nothing is claimed.
#[test]
fn out_of_window_timing_is_rejected() {
    let sim = healthy();
    let timing = SequencerTiming {
        stabilize: Duration::from_ticks(0),
        power_up: Duration::from_ticks(0),
        retry: Duration::from_ticks(0),
        i2s_setup: Duration::from_millis(20),
        ..SequencerTiming::DEFAULT
    };
    let result = MicArray::<CriticalSectionRawMutex, _, _>::new(
        sim.clone(),
        DeviceConfig::new(pins()).with_timing(timing),
        NoopDelay::new(),
    );

    let err = result.err();
    assert_eq!(err, Some(Error::InvalidConfig));
    assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::InvalidArgument));
    assert!(sim.events().is_empty());
}

/// Timing-agnostic bring-up under the critical-section mutex.
#[tokio::test]
async fn bring_up_with_noop_delay() {
    let sim = healthy();
    let mics: MicArray<CriticalSectionRawMutex, _, _> =
        MicArray::new(sim.clone(), DeviceConfig::new(pins()), NoopDelay::new()).unwrap();

    mics.hardware_init().await.unwrap();
    mics.configure_i2s(3_072_000, 48_000).await.unwrap();

    assert!(mics.mic_status().await.all_on());
    assert_eq!(sim.level(LineId(18)), Some(PinState::Low));
}
