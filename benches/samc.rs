use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{arr1, Array1, Array2};
use samc::config::SamcConfig;
use samc::distributions::{GaussianMixture, IsotropicGaussian};
use samc::samc::Samc;

fn config(nv: usize, niter: usize) -> SamcConfig<f64> {
    let inf = f64::INFINITY;
    SamcConfig::builder(nv, arr1(&[-inf, 0.5, 2.0, 4.5, 8.0, inf]))
        .domain(Array2::from_shape_fn((nv, 2), |(_, j)| if j == 0 { -10.0 } else { 10.0 }))
        .niter(niter)
        .stepsize(Array1::from_elem(nv, 0.8))
        .build()
        .unwrap()
}

fn bench_gaussian(c: &mut Criterion) {
    let mut group = c.benchmark_group("samc_isotropic_gaussian");
    for nv in [1, 10, 100] {
        let config = config(nv, 1_000);
        group.bench_with_input(BenchmarkId::new("nv", nv), &config, |b, config| {
            b.iter(|| {
                let mut chain = Samc::new(config, IsotropicGaussian::new(1.0))
                    .unwrap()
                    .set_seed(42);
                black_box(chain.run().unwrap())
            });
        });
    }
    group.finish();
}

fn bench_mixture(c: &mut Criterion) {
    let target = GaussianMixture::new(vec![vec![-5.0, 0.0], vec![5.0, 0.0]], vec![0.5, 0.5], 1.0);
    let config = config(2, 5_000);
    c.bench_function("samc_mixture_5000", |b| {
        b.iter(|| {
            let mut chain = Samc::new(&config, target.clone()).unwrap().set_seed(42);
            black_box(chain.run().unwrap())
        });
    });
}

criterion_group!(benches, bench_gaussian, bench_mixture);
criterion_main!(benches);
