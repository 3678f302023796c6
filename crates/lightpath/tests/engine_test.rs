//! Integration tests for the engine facade: configuration, built-in
//! shapes, rendering through the lock and snapshot exchange.

use std::sync::Arc;
use std::thread;

use lightpath::core::LightpathError;
use lightpath::shared::{BehaviourFlags, ColorRGB, FRAME_MS};
use lightpath::{EmitCommand, Engine, EngineConfig, LineModel, ObjectType};

fn line(pixel_count: u16) -> Engine {
    Engine::new(&EngineConfig {
        object: ObjectType::Line,
        pixel_count: Some(pixel_count),
        seed: 5,
        ..EngineConfig::default()
    })
}

fn single(color: u32) -> EmitCommand {
    EmitCommand {
        length: Some(1),
        color: Some(color),
        from: Some(0),
        ..EmitCommand::new(0, 1.0)
    }
}

/// Test: The default configuration builds a 300-pixel line.
#[test]
fn test_default_engine_is_line() {
    let engine = Engine::default();
    assert_eq!(engine.pixel_count(), 300);
    assert!(engine.is_on());
    assert!(!engine.auto_emit_enabled());

    engine.update(FRAME_MS);
    assert_eq!(engine.frame_bytes().len(), 300 * 3);
    assert!(engine.frame_bytes().iter().all(|&byte| byte == 0));
    engine.with_state(|state| {
        assert_eq!(state.topology().model_count(), 2);
        assert_eq!(state.topology().intersection_total(), 2);
    });
}

/// Test: A TOML configuration selects the cross.
#[test]
fn test_cross_from_config() {
    let engine = Engine::from_toml_str("object = \"cross\"\nseed = 9\n").unwrap();
    assert_eq!(engine.pixel_count(), 288);
    engine.with_state(|state| {
        assert_eq!(state.topology().model_count(), 4);
        assert_eq!(state.topology().intersection_total(), 5);
        assert_eq!(state.topology().connection_total(), 8);
    });

    assert!(Engine::from_toml_str("object = \"cross\"\npixel_count = 4\n").is_err());
}

/// Test: A single light renders at its source, then moves along the run.
#[test]
fn test_single_light_through_engine() {
    let engine = line(30);
    let slot = engine.emit(&single(0xC86432)).unwrap();
    assert_eq!(slot, 0);

    engine.tick(FRAME_MS);
    assert_eq!(engine.now(), FRAME_MS);
    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::new(0xC8, 0x64, 0x32));
    assert_eq!(&engine.frame_bytes()[0..3], &[0xC8, 0x64, 0x32]);

    engine.tick(FRAME_MS);
    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::BLACK);
    assert_eq!(engine.pixel(1, 255).unwrap(), ColorRGB::new(0xC8, 0x64, 0x32));

    assert!(matches!(
        engine.pixel(30, 255),
        Err(LightpathError::OutOfRange { .. })
    ));
}

/// Test: Mirror flip paints the reflected pixel as well.
#[test]
fn test_mirror_flip_on_line() {
    let engine = line(30);
    let command = EmitCommand {
        behaviour: BehaviourFlags::MIRROR_FLIP.bits(),
        ..single(0xFFFFFF)
    };
    engine.emit(&command).unwrap();
    engine.update(FRAME_MS);

    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::WHITE);
    assert_eq!(engine.pixel(29, 255).unwrap(), ColorRGB::WHITE);
    assert_eq!(engine.pixel(15, 255).unwrap(), ColorRGB::BLACK);
}

/// Test: Turning the output off blanks reads without stopping the
/// simulation.
#[test]
fn test_output_off() {
    let engine = line(30);
    engine.emit(&single(0xFFFFFF)).unwrap();
    engine.update(FRAME_MS);

    engine.set_on(false);
    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::BLACK);
    assert!(engine.frame_bytes().iter().all(|&byte| byte == 0));

    engine.set_on(true);
    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::WHITE);
    engine.with_state(|state| assert_eq!(state.active_lists(), 1));
}

/// Test: Commands are validated before they reach the simulation.
#[test]
fn test_command_errors() {
    let engine = line(30);
    assert_eq!(
        engine.emit(&EmitCommand::new(42, 1.0)),
        Err(LightpathError::InvalidModel {
            model: 42,
            available: 2
        })
    );

    let bad_ease = EmitCommand {
        ease: 250,
        ..single(0)
    };
    assert!(matches!(
        engine.emit(&bad_ease),
        Err(LightpathError::InvalidArgument(_))
    ));
    engine.with_state(|state| assert_eq!(state.active_lists(), 0));
}

/// Test: A keyed emission can be found, stopped and reclaimed.
#[test]
fn test_stop_note() {
    let engine = line(30);
    let command = EmitCommand {
        note_id: 5,
        length: Some(4),
        ..EmitCommand::new(0, 1.0)
    };
    let slot = engine.emit(&command).unwrap();
    assert_eq!(engine.find_note(5), Some(slot));
    assert_eq!(engine.find_note(6), None);

    engine.update(FRAME_MS);
    assert!(engine.stop_note(slot));
    for _ in 0..10 {
        engine.tick(FRAME_MS);
    }
    assert_eq!(engine.find_note(5), None);
    engine.with_state(|state| assert_eq!(state.total_lights(), 0));
}

/// Test: Stopping everything drains the engine.
#[test]
fn test_stop_all() {
    let engine = line(30);
    engine.emit(&single(0xFF0000)).unwrap();
    engine.emit(&single(0x00FF00)).unwrap();
    engine.update(FRAME_MS);

    assert_eq!(engine.stop_all(), 2);
    for _ in 0..10 {
        engine.tick(FRAME_MS);
    }
    engine.with_state(|state| assert_eq!(state.active_lists(), 0));
    assert!(engine.frame_bytes().iter().all(|&byte| byte == 0));
}

/// Test: A snapshot exported from one engine rebuilds the same graph in
/// another.
#[test]
fn test_snapshot_between_engines() {
    let source = line(30);
    let snapshot = source.export_snapshot();

    let target = Engine::new(&EngineConfig {
        object: ObjectType::Cross,
        ..EngineConfig::default()
    });
    target.import_snapshot(&snapshot, true).unwrap();
    assert_eq!(target.pixel_count(), 30);
    assert_eq!(target.export_snapshot(), snapshot);

    target.emit(&single(0x00FF00)).unwrap();
    target.update(FRAME_MS);
    assert_eq!(target.pixel(0, 255).unwrap(), ColorRGB::new(0, 0xFF, 0));
}

/// Test: Importing a snapshot while lists run drops them and frees the
/// whole budget; the next frame is black and new emissions start clean.
#[test]
fn test_import_snapshot_drops_running_lists() {
    let engine = line(30);
    engine.emit(&single(0xFF0000)).unwrap();
    engine
        .emit(&EmitCommand {
            note_id: 3,
            length: Some(5),
            ..EmitCommand::new(0, 1.0)
        })
        .unwrap();
    for _ in 0..5 {
        engine.tick(FRAME_MS);
    }
    engine.with_state(|state| assert_eq!(state.active_lists(), 2));

    let snapshot = line(12).export_snapshot();
    engine.import_snapshot(&snapshot, true).unwrap();
    assert_eq!(engine.pixel_count(), 12);
    assert_eq!(engine.find_note(3), None);
    engine.with_state(|state| {
        assert_eq!(state.active_lists(), 0);
        assert_eq!(state.total_lights(), 0);
    });
    assert!(engine.frame_bytes().iter().all(|&byte| byte == 0));

    engine.tick(FRAME_MS);
    assert!(engine.frame_bytes().iter().all(|&byte| byte == 0));
    engine.emit(&single(0x0000FF)).unwrap();
    engine.tick(FRAME_MS);
    assert_eq!(engine.pixel(0, 255).unwrap(), ColorRGB::new(0, 0, 0xFF));
}

/// Test: Ticks from several threads each advance the clock exactly once.
#[test]
fn test_concurrent_ticks_accumulate() {
    let engine = Arc::new(line(30));
    engine.emit(&single(0xFFFFFF)).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..100 {
                    engine.tick(FRAME_MS);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.now(), 4 * 100 * FRAME_MS);
    engine.with_state(|state| assert_eq!(state.active_lists(), 1));
}

/// Test: The bounce model turns a light around at both ends of the run
/// instead of wrapping it through the bridge.
#[test]
fn test_bounce_reverses_at_line_ends() {
    let engine = line(30);
    let command = EmitCommand {
        model: LineModel::Bounce.id(),
        behaviour: BehaviourFlags::FORCE_BOUNCE.bits(),
        ..single(0xFFFFFF)
    };
    engine.emit(&command).unwrap();

    let mut trace = Vec::new();
    for _ in 0..120 {
        engine.tick(FRAME_MS);
        let lit: Vec<u16> = (0..30)
            .filter(|pixel| engine.pixel(*pixel, 255).unwrap() != ColorRGB::BLACK)
            .collect();
        assert!(lit.len() <= 1, "{lit:?}");
        trace.extend(lit);
    }

    assert!(trace.contains(&29), "{trace:?}");
    let far_end = trace.iter().position(|&pixel| pixel == 29).unwrap();
    assert!(trace[far_end..].contains(&0), "{trace:?}");
    for pair in trace.windows(2) {
        assert!(pair[0].abs_diff(pair[1]) <= 1, "{trace:?}");
    }
}

/// Test: Auto-emission fills the object and shows up in the probe.
#[test]
fn test_auto_emit_and_probe() {
    let engine = Engine::from_toml_str("auto_emit = true\nseed = 3\n").unwrap();
    assert!(engine.auto_emit_enabled());

    engine.update(FRAME_MS);
    engine.with_state(|state| assert_eq!(state.active_lists(), 1));

    for frame in 2..=120 {
        engine.update(frame * FRAME_MS);
    }
    let report = engine.probe().unwrap();
    assert!(report.fps > 60.0 && report.fps < 66.0, "{report:?}");
    assert!(report.emits_per_frame > 0.0);

    engine.set_auto_emit(false);
    assert!(!engine.auto_emit_enabled());
}
