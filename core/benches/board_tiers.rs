use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use minesweeper_core::*;

fn bench_first_reveal(c: &mut Criterion) {
    for tier in Tier::ALL {
        let config = tier.config();
        let center = (config.size.0 / 2, config.size.1 / 2);

        c.bench_function(&format!("first_reveal_{}", tier.key()), |b| {
            let mut seed = 0u64;
            b.iter(|| {
                seed = seed.wrapping_add(1);
                let mut engine = PlayEngine::new(config, black_box(seed));
                black_box(engine.reveal(center))
            });
        });
    }
}

fn bench_generation(c: &mut Criterion) {
    let config = Tier::Expert.config();

    c.bench_function("generate_expert", |b| {
        b.iter(|| RandomLayoutGenerator::new(black_box(42), (0, 0)).generate(config));
    });
}

fn bench_open_board_flood(c: &mut Criterion) {
    let layout = MineLayout::from_mine_coords((30, 16), &[(29, 15)]).unwrap();

    c.bench_function("flood_expert_single_mine", |b| {
        b.iter(|| {
            let mut engine = PlayEngine::with_layout(layout.clone());
            black_box(engine.reveal((0, 0)))
        });
    });
}

criterion_group!(benches, bench_first_reveal, bench_generation, bench_open_board_flood);
criterion_main!(benches);
