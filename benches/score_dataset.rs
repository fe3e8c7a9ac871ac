use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eva_engine::{ComponentInput, Dataset, EvScorer, UserClassifications};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_dataset(rng: &mut StdRng, n_subzones: usize, n_features: usize) -> Dataset {
    let ids: Vec<String> = (0..n_subzones).map(|i| format!("SZ{:05}", i)).collect();
    let features: Vec<String> = (0..n_features).map(|j| format!("feature_{}", j)).collect();
    let columns: Vec<Vec<Option<f64>>> = (0..n_features)
        .map(|_| {
            (0..n_subzones)
                .map(|_| {
                    if rng.gen_bool(0.3) {
                        Some(rng.gen_range(0.0..250.0))
                    } else {
                        Some(0.0)
                    }
                })
                .collect()
        })
        .collect();
    Dataset::new(ids, features, columns).unwrap()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_dataset");
    let scorer = EvScorer::default();
    let tags = UserClassifications::default();
    let mut rng = StdRng::seed_from_u64(7);

    for &(subzones, features) in &[(100, 10), (1_000, 50), (10_000, 100)] {
        let ds = random_dataset(&mut rng, subzones, features);
        group.bench_with_input(
            BenchmarkId::new("quantitative", format!("{}x{}", subzones, features)),
            &ds,
            |b, ds| b.iter(|| scorer.score(black_box(ds), None, &tags).unwrap()),
        );
    }

    group.finish();
}

fn bench_parallel_components(c: &mut Criterion) {
    let scorer = EvScorer::default();
    let mut rng = StdRng::seed_from_u64(11);

    let inputs: Vec<ComponentInput> = (0..8)
        .map(|i| ComponentInput {
            name: format!("EC{}", i),
            dataset: random_dataset(&mut rng, 2_000, 40),
            data_type: None,
            user_classifications: UserClassifications::default(),
        })
        .collect();

    c.bench_function("score_components_parallel_8x2000", |b| {
        b.iter(|| scorer.score_components_parallel(black_box(&inputs)).unwrap())
    });
}

criterion_group!(benches, bench_score, bench_parallel_components);
criterion_main!(benches);
