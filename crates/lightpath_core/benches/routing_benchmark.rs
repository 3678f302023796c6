//! Benchmark for the simulation tick on a hand-built ring.
//!
//! Six intersections joined in a ring, every list routed through them.
//! Measures one `State::update` with the light budget nearly full.
//!
//! Run with: cargo bench --package lightpath_core --bench routing_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lightpath_core::{EmitParams, Model, PlainLayout, RuntimeLimits, State, Topology};
use lightpath_procedural::{NoiseField, NoiseSeed, Random};

fn ring(pixel_count: u16, nodes: u16) -> Topology {
    let mut topology = Topology::new(pixel_count);
    let step = pixel_count / nodes;
    let ids: Vec<_> = (0..nodes)
        .filter_map(|i| topology.add_intersection(2, i * step, None, 1))
        .collect();
    for (i, from) in ids.iter().enumerate() {
        let to = ids[(i + 1) % ids.len()];
        topology.add_connection(*from, to, 1, Some(step - 1));
    }
    topology.add_model(Model::new(0, 10, 1));
    topology
}

fn loaded_state(lists: u16, length: u16) -> State {
    let mut state = State::new(
        ring(600, 6),
        Box::new(PlainLayout::default()),
        RuntimeLimits::default(),
        Random::with_seed(42),
        NoiseField::new(NoiseSeed::new(42)),
    );
    for _ in 0..lists {
        let params = EmitParams::new(0, 2.0).with_length(length);
        let _ = state.emit(&params, 0);
    }
    state
}

fn benchmark_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_update");
    group.throughput(Throughput::Elements(1_600));

    group.bench_function("16_lists_of_100", |b| {
        let mut state = loaded_state(16, 100);
        let mut now = 0u64;
        b.iter(|| {
            now += 16;
            state.update(black_box(now));
            black_box(state.frame_bytes().len())
        });
    });

    group.finish();
}

fn benchmark_emit(c: &mut Criterion) {
    c.bench_function("emit_and_reclaim", |b| {
        let mut state = loaded_state(0, 0);
        let mut now = 0u64;
        b.iter(|| {
            now += 16;
            let params = EmitParams::new(0, 1.0).with_length(20).with_duration(1);
            let _ = black_box(state.emit(&params, now));
            state.update(now + 16);
        });
    });
}

criterion_group!(benches, benchmark_tick, benchmark_emit);
criterion_main!(benches);
