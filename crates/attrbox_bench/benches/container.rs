use attrbox_core::{AttrContainer, AttrRead, AttrView, ContainerConfig, GrowthPolicy, SystemAllocator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(n: usize, growth: GrowthPolicy) -> AttrContainer {
    let cfg = ContainerConfig { growth, ..Default::default() };
    let mut c = AttrContainer::create_in("bench", SystemAllocator, cfg).unwrap();
    for i in 0..n {
        c.set_int64(format!("key-{i}"), i as i64).unwrap();
    }
    c
}

fn bench_container(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<String> = (0..64).map(|_| format!("key-{}", rng.random_range(0..64))).collect();

    c.bench_function("set_64_exact", |b| b.iter(|| black_box(filled(64, GrowthPolicy::Exact))));
    c.bench_function("set_64_amortized", |b| b.iter(|| black_box(filled(64, GrowthPolicy::Amortized))));

    let full = filled(64, GrowthPolicy::Exact);
    c.bench_function("get_64", |b| {
        b.iter(|| keys.iter().map(|k| full.get_as_int64(k)).sum::<i64>())
    });

    let mut resize = filled(64, GrowthPolicy::Amortized);
    let mut flip = false;
    c.bench_function("overwrite_resize", |b| {
        b.iter(|| {
            flip = !flip;
            let v = if flip { "short" } else { "a considerably longer value" };
            resize.set_string("key-0", v).unwrap();
        })
    });

    let wire = full.to_bytes();
    c.bench_function("view_parse", |b| b.iter(|| black_box(AttrView::new(&wire).unwrap().attr_num())));
}

criterion_group!(benches, bench_container);
criterion_main!(benches);
