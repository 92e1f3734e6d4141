//! SAMC on a one-dimensional mixture whose two modes sit far apart.
//!
//! A random-walk Metropolis chain with the same step size stays in the mode
//! it starts in. SAMC keeps raising the bias of the partitions it sits in, so
//! the chain climbs over the barrier and alternates between both modes.

use ndarray::{arr1, arr2};
use samc::config::SamcConfig;
use samc::distributions::GaussianMixture;
use samc::samc::Samc;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    const NITER: usize = 100_000;
    let inf = f64::INFINITY;

    let target = GaussianMixture::new(vec![vec![-5.0], vec![5.0]], vec![0.3, 0.7], 0.5);
    let config = SamcConfig::builder(1, arr1(&[-inf, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, inf]))
        .domain(arr2(&[[-10.0, 10.0]]))
        .niter(NITER)
        .t0(100.0)
        .xi(0.6)
        .stepsize(arr1(&[0.5]))
        .build()?;

    let mut samc = Samc::new(&config, target)?.set_seed(42);
    let output = samc.run_progress()?;

    let left = output.samples.iter().filter(|&&x| x < 0.0).count();
    println!(
        "Visited left mode in {:.1}% of iterations",
        100.0 * left as f64 / NITER as f64
    );
    println!("Acceptance rate: {:.3}", output.acceptance_rate());

    println!("partition    visits        theta   est. mass");
    let weights = output.partition_weights();
    for j in 0..samc.partition().n_bins() {
        let (low, high) = samc.partition().bounds(j);
        println!(
            "[{low:>5}, {high:>5})  {:>8}  {:>11.3}   {:.3e}",
            output.frequency[j], output.theta[j], weights[j]
        );
    }

    // Importance weights undo the flattening: the left mode holds about 30%
    let log_w = output.log_importance_weights();
    let max = log_w.fold(f64::NEG_INFINITY, |m, &l| m.max(l));
    let (mut left_mass, mut total) = (0.0, 0.0);
    for (x, l) in output.samples.iter().zip(log_w.iter()) {
        let w = (l - max).exp();
        total += w;
        if *x < 0.0 {
            left_mass += w;
        }
    }
    println!("Estimated weight of left mode: {:.3}", left_mass / total);

    Ok(())
}
