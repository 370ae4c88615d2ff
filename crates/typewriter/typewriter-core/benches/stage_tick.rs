use criterion::{black_box, criterion_group, criterion_main, Criterion};
use typewriter_core::{Config, MemorySurface, Stage, Triggers};

const PARAGRAPH: &str = "Systems, parsers and small tools, written slowly and with care.";

fn staggered_stage(targets: usize) -> Stage<MemorySurface> {
    let mut stage = Stage::new();
    for nth in 0..targets {
        let cfg = Config::default().with_delay(nth as u64 * 200);
        stage
            .mount(MemorySurface::new(PARAGRAPH), None, cfg, Triggers::visibility())
            .expect("mount");
    }
    let ids: Vec<_> = stage.targets().collect();
    for id in ids {
        stage.visibility(id, 1.0);
    }
    stage
}

fn bench_stage(c: &mut Criterion) {
    c.bench_function("stage_64_targets_full_reveal", |b| {
        b.iter(|| {
            let mut stage = staggered_stage(64);
            while let Some(deadline) = stage.next_deadline() {
                black_box(stage.advance_to(deadline));
            }
        })
    });
}

criterion_group!(benches, bench_stage);
criterion_main!(benches);
