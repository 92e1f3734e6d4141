use ndarray::{arr1, arr2};
use samc::config::SamcConfig;
use samc::samc::Samc;

fn main() {
    let inf = f64::INFINITY;
    let config = SamcConfig::builder(1, arr1(&[-inf, -5.0, 0.0, 5.0, inf]))
        .domain(arr2(&[[-10.0, 10.0]]))
        .niter(10_000)
        .t0(1.0)
        .xi(0.8)
        .stepsize(arr1(&[1.0]))
        .trange(arr2(&[[-50.0, 50.0]; 4]))
        .build()
        .unwrap();

    // Energy x^2 never drops below zero, so the two lowest partitions stay empty
    let mut samc = Samc::new(&config, |x: &[f64]| x[0] * x[0])
        .unwrap()
        .set_seed(42);
    let output = samc.run().unwrap();

    assert_eq!(output.samples.nrows(), 10_000);
    assert_eq!(output.frequency.sum(), 10_000);
    println!("frequency: {}", output.frequency);
    println!("theta:     {:.3}", output.theta);
}
