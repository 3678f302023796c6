//! Integration tests for emission, the light budget and rendering.
//!
//! Every test runs on a 30-pixel loop: intersection A at pixel 0, B at
//! pixel 29, a 28-LED run A -> B and a zero-length bridge B -> A.

use lightpath_core::{
    EmitParams, EmitSource, LightpathError, ListPhase, Model, PlainLayout, RuntimeLimits, State,
    Topology,
};
use lightpath_procedural::{NoiseField, NoiseSeed, Random};
use lightpath_shared::{groups, ColorRGB};

const GROUP: u8 = groups::GROUP1;

fn strip() -> Topology {
    let mut topology = Topology::new(30);
    let a = topology.add_intersection(2, 0, None, GROUP).unwrap();
    let b = topology.add_intersection(2, 29, None, GROUP).unwrap();
    topology.add_connection(a, b, GROUP, Some(28)).unwrap();
    topology.add_connection(b, a, GROUP, Some(0)).unwrap();
    topology.add_model(Model::new(0, 10, GROUP));
    topology
}

fn state_with(limits: RuntimeLimits) -> State {
    State::new(
        strip(),
        Box::new(PlainLayout::default()),
        limits,
        Random::with_seed(11),
        NoiseField::new(NoiseSeed::new(11)),
    )
}

fn state() -> State {
    state_with(RuntimeLimits::default())
}

fn single(color: u32) -> EmitParams {
    EmitParams::new(0, 1.0)
        .with_length(1)
        .with_color(ColorRGB::from_u32(color))
        .with_source(EmitSource::Auto)
}

/// Test: A single light renders at its source pixel on the first tick
/// and moves onto the first LED on the second.
#[test]
fn test_single_light_renders_at_source() {
    let mut state = state();
    state.emit(&single(0xC86432), 0).unwrap();

    state.update(16);
    assert_eq!(state.get_pixel(0, 255).unwrap(), ColorRGB::new(0xC8, 0x64, 0x32));
    assert_eq!(state.get_pixel(1, 255).unwrap(), ColorRGB::BLACK);

    state.update(32);
    assert_eq!(state.get_pixel(0, 255).unwrap(), ColorRGB::BLACK);
    assert_eq!(state.get_pixel(1, 255).unwrap(), ColorRGB::new(0xC8, 0x64, 0x32));
}

/// Test: The brightness ceiling scales the rendered color.
#[test]
fn test_max_brightness_dims_color() {
    let mut state = state();
    let params = EmitParams {
        max_bri: 128,
        ..single(0xC86432)
    };
    state.emit(&params, 0).unwrap();
    state.update(16);

    let pixel = state.get_pixel(0, 255).unwrap();
    assert!(pixel.r.abs_diff(100) <= 2, "{pixel:?}");
    assert!(pixel.g.abs_diff(50) <= 2, "{pixel:?}");
    assert!(pixel.b.abs_diff(25) <= 2, "{pixel:?}");
}

/// Test: The zero-length bridge forwards lights around the loop forever
/// and nothing is painted outside the object.
#[test]
fn test_light_loops_through_bridge() {
    let mut state = state();
    state.emit(&single(0xFFFFFF), 0).unwrap();

    let mut lit_ticks = 0;
    for tick in 1..=200u64 {
        state.update(tick * 16);
        assert_eq!(state.frame().len(), 30);
        if state.frame().iter().any(|pixel| !pixel.is_black()) {
            lit_ticks += 1;
        }
    }

    assert!(lit_ticks > 150, "light went dark after {lit_ticks} lit ticks");
    assert_eq!(state.active_lists(), 1);
    assert_eq!(state.list(0).unwrap().phase(), ListPhase::Active);
}

/// Test: Validation order and error values.
#[test]
fn test_emit_errors() {
    let mut state = state();

    let inverted = EmitParams {
        min_bri: 200,
        max_bri: 100,
        ..single(0)
    };
    assert!(matches!(state.emit(&inverted, 0), Err(LightpathError::InvalidArgument(_))));

    let unknown = EmitParams {
        model: 42,
        ..single(0)
    };
    assert_eq!(
        state.emit(&unknown, 0),
        Err(LightpathError::InvalidModel {
            model: 42,
            available: 1
        })
    );

    let elsewhere = EmitParams {
        emit_groups: groups::GROUP3,
        ..single(0)
    };
    assert_eq!(
        state.emit(&elsewhere, 0),
        Err(LightpathError::NoEmitterAvailable {
            groups: groups::GROUP3
        })
    );

    let past_end = single(0).with_source(EmitSource::Index(5));
    assert!(matches!(
        state.emit(&past_end, 0),
        Err(LightpathError::NoEmitterAvailable { .. })
    ));

    assert_eq!(state.active_lists(), 0);
    assert_eq!(state.total_lights(), 0);
}

/// Test: The budget is never exceeded and an oversized emission fails
/// as a whole.
#[test]
fn test_light_budget() {
    let mut state = state_with(RuntimeLimits {
        max_light_lists: 2,
        max_total_lights: 10,
    });

    assert_eq!(state.emit(&single(0).with_length(6), 0), Ok(0));
    assert_eq!(state.total_lights(), 6);

    assert_eq!(
        state.emit(&single(0).with_length(5), 0),
        Err(LightpathError::CapacityExceeded {
            requested: 5,
            available: 4
        })
    );
    assert_eq!(state.total_lights(), 6);
    assert_eq!(state.active_lists(), 1);

    assert_eq!(state.emit(&single(0).with_length(4), 0), Ok(1));
    assert_eq!(state.total_lights(), 10);

    assert_eq!(
        state.emit(&single(0), 0),
        Err(LightpathError::NoFreeSlot { capacity: 2 })
    );
}

/// Test: A random length is clamped to what is left of the budget.
#[test]
fn test_random_length_clamped_to_budget() {
    let mut state = state_with(RuntimeLimits {
        max_light_lists: 4,
        max_total_lights: 3,
    });
    let params = EmitParams::new(0, 1.0);
    state.emit(&params, 0).unwrap();
    assert!(state.total_lights() >= 1 && state.total_lights() <= 3);

    let mut empty = state_with(RuntimeLimits {
        max_light_lists: 4,
        max_total_lights: 0,
    });
    assert_eq!(
        empty.emit(&params, 0),
        Err(LightpathError::CapacityExceeded {
            requested: 1,
            available: 0
        })
    );
}

/// Test: Re-emitting a note id restarts the same slot in place.
#[test]
fn test_note_retrigger_reuses_slot() {
    let mut state = state();
    let first = EmitParams {
        note_id: 7,
        ..single(0).with_length(3)
    };
    let second = EmitParams {
        note_id: 7,
        ..single(0).with_length(5)
    };

    assert_eq!(state.emit(&single(0), 0), Ok(0));
    assert_eq!(state.emit(&first, 0), Ok(1));
    let id = state.list(1).unwrap().id;
    state.update(16);

    assert_eq!(state.emit(&second, 10), Ok(1));
    let list = state.list(1).unwrap();
    assert_eq!(list.id, id);
    assert_eq!(list.num_lights(), 5);
    assert_eq!(list.lights().count(), 5);
    assert_eq!(list.phase(), ListPhase::Seeded);
    assert_eq!(state.find_list(7), Some(1));
    assert_eq!(state.find_list(0), None);
    assert_eq!(state.active_lists(), 2);
    assert_eq!(state.total_lights(), 6);
}

/// Test: Lists with a lifetime drain and their slot and budget return.
#[test]
fn test_expired_lists_are_reclaimed() {
    let mut state = state();
    let params = single(0x00FF00).with_length(2).with_duration(100);
    state.emit(&params, 0).unwrap();

    for tick in 1..=200u64 {
        state.update(tick * 16);
    }

    assert_eq!(state.active_lists(), 0);
    assert_eq!(state.total_lights(), 0);
    assert!(state.frame().iter().all(|pixel| pixel.is_black()));
    assert_eq!(state.emit(&params, 4000), Ok(0));
}

/// Test: Stopping twice is a no-op the second time and drains the lists.
#[test]
fn test_stop_all_twice() {
    let mut state = state();
    state.emit(&single(0).with_length(4), 0).unwrap();
    state.emit(&single(0).with_length(4), 0).unwrap();
    state.update(16);

    assert_eq!(state.stop_all(20), 2);
    assert_eq!(state.stop_all(20), 0);
    assert_eq!(state.list(0).unwrap().phase(), ListPhase::Draining);

    for tick in 2..=10u64 {
        state.update(tick * 16);
    }
    assert_eq!(state.active_lists(), 0);
    assert_eq!(state.total_lights(), 0);
}

/// Test: Pixel queries check the range and honor on/off and gaps.
#[test]
fn test_pixel_queries() {
    let mut state = state();
    assert_eq!(
        state.get_pixel(30, 255),
        Err(LightpathError::OutOfRange {
            index: 30,
            pixel_count: 30
        })
    );

    state.emit(&single(0xFFFFFF), 0).unwrap();
    state.update(16);
    assert!(!state.get_pixel(0, 255).unwrap().is_black());

    state.set_on(false);
    assert_eq!(state.get_pixel(0, 255).unwrap(), ColorRGB::BLACK);
    state.set_on(true);
    assert_eq!(state.get_pixel(0, 0).unwrap(), ColorRGB::BLACK);
}

/// Test: Pixels inside a gap are black and the frame holds only real
/// pixels.
#[test]
fn test_gap_pixels() {
    let mut state = state();
    assert!(state.topology_mut().add_gap(0, 0));

    state.emit(&single(0xFFFFFF), 0).unwrap();
    state.update(16);
    assert_eq!(state.frame().len(), 29);
    assert_eq!(state.get_pixel(0, 255).unwrap(), ColorRGB::BLACK);

    state.update(32);
    assert!(!state.get_pixel(1, 255).unwrap().is_black());
    assert!(!state.frame()[0].is_black());
}

/// Test: Auto-emission only fires when enabled and due.
#[test]
fn test_auto_emit() {
    let mut state = state();
    assert_eq!(state.auto_emit(0), None);

    state.set_auto_emit(true);
    assert!(state.auto_emit(0).is_some());
    assert_eq!(state.auto_emit(1), None);
    assert_eq!(state.active_lists(), 1);
}

/// Test: Palette colors follow the selected built-in gradient.
#[test]
fn test_palette_color() {
    let mut state = state();
    state.set_palette(1);
    let first = state.palette_color(0, 255);
    let last = state.palette_color(255, 255);
    assert_ne!(first, last);
    assert_eq!(state.palette_color(0, 0), first.dim(0));
}

/// Two intersections joined only by zero-length bridges.
fn bridge_loop(far_pixel: u16) -> State {
    let mut topology = Topology::new(30);
    let a = topology.add_intersection(2, 0, None, GROUP).unwrap();
    let b = topology.add_intersection(2, far_pixel, None, GROUP).unwrap();
    topology.add_connection(a, b, GROUP, Some(0)).unwrap();
    topology.add_connection(b, a, GROUP, Some(0)).unwrap();
    topology.add_model(Model::new(0, 10, GROUP));
    State::new(
        topology,
        Box::new(PlainLayout::default()),
        RuntimeLimits::default(),
        Random::with_seed(11),
        NoiseField::new(NoiseSeed::new(11)),
    )
}

fn lit_pixels(state: &State) -> Vec<usize> {
    state
        .frame()
        .iter()
        .enumerate()
        .filter(|(_, pixel)| !pixel.is_black())
        .map(|(index, _)| index)
        .collect()
}

/// Test: A light released far beyond a bridge-only loop catches up over
/// several frames instead of routing without bound, then shows on one
/// of the two intersection pixels every tick.
#[test]
fn test_bridge_loop_with_large_offset() {
    let mut state = bridge_loop(2);
    let params = EmitParams {
        emit_offset: 60_000,
        ..single(0xFFFFFF)
    };
    state.emit(&params, 0).unwrap();

    for tick in 1..=200u64 {
        state.update(tick * 16);
    }
    for tick in 201..=220u64 {
        state.update(tick * 16);
        let lit = lit_pixels(&state);
        assert!(lit == vec![0] || lit == vec![2], "tick {tick}: {lit:?}");
    }
    assert_eq!(state.active_lists(), 1);
}

/// Test: A speed far above what one frame can route keeps the light
/// alive and in flight without painting anything.
#[test]
fn test_bridge_loop_with_huge_speed() {
    let mut state = bridge_loop(2);
    let params = EmitParams {
        speed: 200_000.0,
        ..single(0xFFFFFF)
    };
    state.emit(&params, 0).unwrap();

    for tick in 1..=50u64 {
        state.update(tick * 16);
    }
    assert_eq!(state.active_lists(), 1);
    assert_eq!(state.total_lights(), 1);
    assert_eq!(state.list(0).unwrap().lights().count(), 1);
}

/// Test: Zero-length connections never paint; the light alternates
/// between the two intersection pixels one at a time.
#[test]
fn test_bridges_never_render() {
    let mut state = bridge_loop(29);
    state.emit(&single(0xFFFFFF), 0).unwrap();

    let mut seen = Vec::new();
    for tick in 1..=100u64 {
        state.update(tick * 16);
        let lit = lit_pixels(&state);
        assert_eq!(lit.len(), 1, "tick {tick}: {lit:?}");
        assert!(lit[0] == 0 || lit[0] == 29, "tick {tick}: {lit:?}");
        seen.push(lit[0]);
    }
    assert!(seen.contains(&0) && seen.contains(&29));
}
