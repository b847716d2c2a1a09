//! Benchmarks for the tile engine and the doubling evaluators.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use unshape_eca::{
    Budget, EngineConfig, HashLife1D, HashNode, PatternSeed, Rule, parse_pattern, rule110,
};

fn bench_tiles(c: &mut Criterion) {
    c.bench_function("tile_cold_t8_s64", |b| {
        b.iter(|| {
            let mut engine = EngineConfig::new(Rule::new(110))
                .with_tile_size(64)
                .build()
                .unwrap();
            black_box(engine.get_tile(black_box(0), black_box(8), &Budget::unlimited()))
        })
    });

    c.bench_function("tile_cold_t8_s200", |b| {
        b.iter(|| {
            let mut engine = EngineConfig::new(Rule::new(110)).build().unwrap();
            black_box(engine.get_tile(black_box(0), black_box(8), &Budget::unlimited()))
        })
    });

    c.bench_function("tile_ether_row", |b| {
        let ether = parse_pattern(rule110::ETHER).unwrap();
        b.iter(|| {
            let mut engine = EngineConfig::new(Rule::new(110))
                .with_tile_size(56)
                .build()
                .unwrap();
            engine.set_initial_state(PatternSeed::periodic(ether.clone()).unwrap());
            black_box(engine.row_segment(0, 560, black_box(200), &Budget::unlimited()))
        })
    });

    c.bench_function("tile_cache_hit", |b| {
        let mut engine = EngineConfig::new(Rule::new(110))
            .with_tile_size(64)
            .build()
            .unwrap();
        let _ = engine.get_tile(0, 4, &Budget::unlimited());
        b.iter(|| black_box(engine.get_tile(black_box(0), black_box(4), &Budget::unlimited())))
    });
}

fn bench_hash_node(c: &mut Criterion) {
    let cells: Vec<bool> = (0..1024).map(|i| (i * 7 + i / 3) % 5 == 0).collect();
    let node = HashNode::from_cells(Rule::new(110), &cells).unwrap();

    c.bench_function("hash_node_step_1024", |b| b.iter(|| black_box(node.step())));

    c.bench_function("hash_node_advance_1024_4", |b| {
        b.iter(|| black_box(node.advance(black_box(4))))
    });
}

fn bench_hashlife(c: &mut Criterion) {
    c.bench_function("hashlife_rule90_2p16", |b| {
        b.iter(|| {
            let mut line = HashLife1D::new(Rule::new(90)).unwrap();
            line.set_cell(0, true);
            line.step_pow2(black_box(16));
            black_box(line.population())
        })
    });

    c.bench_function("hashlife_rule110_1000_steps", |b| {
        b.iter(|| {
            let mut line = HashLife1D::new(Rule::new(110)).unwrap();
            line.set_cell(0, true);
            line.steps(black_box(1000));
            black_box(line.population())
        })
    });
}

criterion_group!(benches, bench_tiles, bench_hash_node, bench_hashlife);
criterion_main!(benches);
