//! Engine benchmarks: full pipeline and JSON request parsing.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use allocbook::{EngineConfig, Portfolio, RebalanceRequest, rebalance};

/// Equal-weight model over `n` assets with deterministic pseudo-random values.
fn generate_inputs(n: usize) -> (Vec<(String, f64)>, Vec<(String, f64)>) {
    let assets: Vec<String> = (0..n).map(|i| format!("S{i:04}")).collect();
    let mut weights = vec![1.0 / n as f64; n];
    let head: f64 = weights[..n - 1].iter().sum();
    weights[n - 1] = 1.0 - head;

    // Simple deterministic PRNG (xorshift32)
    let mut rng_state: u32 = 42;
    let values = assets
        .iter()
        .map(|a| {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 17;
            rng_state ^= rng_state << 5;
            (a.clone(), 100.0 + (rng_state % 100_000) as f64)
        })
        .collect();

    (assets.into_iter().zip(weights).collect(), values)
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/pipeline");

    for n in [4, 50, 500] {
        let (model, values) = generate_inputs(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut p = Portfolio::new(
                    model.iter().map(|(a, w)| (a.as_str(), *w)),
                    EngineConfig::default(),
                )
                .unwrap();
                p.set_current_values(values.iter().map(|(a, v)| (a.as_str(), *v)))
                    .unwrap();
                p.calc_current_mix().unwrap();
                p.calc_delta_to_target(Some(10_000.0)).unwrap();
                black_box(p.into_rebalance())
            })
        });
    }

    group.finish();
}

fn to_object(pairs: Vec<(String, f64)>) -> serde_json::Map<String, serde_json::Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::from(v)))
        .collect()
}

fn bench_request(c: &mut Criterion) {
    let (model, values) = generate_inputs(50);
    let body = serde_json::json!({
        "model": to_object(model),
        "new_money": 2000,
        "values": to_object(values),
    })
    .to_string();

    c.bench_function("engine/request_50", |b| {
        b.iter(|| {
            let request = RebalanceRequest::from_json_str(black_box(&body)).unwrap();
            black_box(rebalance(&request, EngineConfig::default(), None).unwrap())
        })
    });
}

criterion_group!(benches, bench_pipeline, bench_request);
criterion_main!(benches);
