//! Benchmarks for grid construction and macroscopic cross-section lookups

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xsbench::sampling::sample_lookup;
use xsbench::{CrossSectionData, FastRng, MaterialProfile, NuclideGrids, UnionizedGrid};

fn bench_unionized_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Unionized grid build");
    group.sample_size(10);

    for n_gridpoints in [100, 1000].iter() {
        let mut grids = NuclideGrids::generate(68, *n_gridpoints, &mut FastRng::new(26)).unwrap();
        grids.sort();
        group.bench_with_input(BenchmarkId::new("small", n_gridpoints), &grids, |b, grids| {
            b.iter(|| black_box(UnionizedGrid::build(grids).unwrap()))
        });
    }
    group.finish();
}

fn bench_macro_xs(c: &mut Criterion) {
    let mut group = c.benchmark_group("Macroscopic XS lookup");

    for profile in [MaterialProfile::Small, MaterialProfile::Large] {
        let data = CrossSectionData::generate(
            profile.n_isotopes(),
            300,
            profile,
            &mut FastRng::new(26),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("lookup", profile), &data, |b, data| {
            let mut rng = FastRng::new(7);
            b.iter(|| {
                let (energy, material) = sample_lookup(&mut rng, data.materials());
                black_box(data.calculate_macro_xs(energy, material))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_unionized_build, bench_macro_xs);
criterion_main!(benches);
