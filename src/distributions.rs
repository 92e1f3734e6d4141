/*!
Energy functions and proposal kernels.

An energy is the negative log of an unnormalised density. Anything that
implements [`Energy`] can be sampled, including plain closures over `&[T]`:

```rust
use samc::distributions::Energy;

let quadratic = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
assert_eq!(quadratic.energy(&[1.0, 2.0]), 5.0);
```

Candidate points are produced by a [`Proposal`]; the sampler uses the
[`GaussianRandomWalk`], which perturbs each coordinate independently.

This module also provides a few reference energies used by the demos and
tests.
*/

use ndarray::{Array1, Array2};
use num_traits::Float;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use crate::error::ConfigError;

/// Negative log-density of a target distribution on `R^nv`.
///
/// Implementations must be deterministic. Returning `+inf` marks a point of
/// zero density; returning NaN aborts the run.
pub trait Energy<T> {
    fn energy(&self, x: &[T]) -> T;
}

impl<T, F> Energy<T> for F
where
    F: Fn(&[T]) -> T,
{
    fn energy(&self, x: &[T]) -> T {
        self(x)
    }
}

/// A trait for generating candidate points in Metropolis-type samplers.
///
/// Kernels must be symmetric: the acceptance ratio carries no proposal
/// density term.
pub trait Proposal<T: Float> {
    /// Samples a candidate from q(x' | x).
    fn sample<R: Rng + ?Sized>(&self, current: &[T], rng: &mut R) -> Vec<T>;
}

/**
Random-walk proposal adding independent Gaussian noise to every coordinate.

The standard deviation is either a single value shared by all dimensions or
one value per dimension. The kernel is symmetric, so it never contributes
to the acceptance ratio.

# Examples

```rust
use samc::distributions::{GaussianRandomWalk, Proposal};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let walk = GaussianRandomWalk::new(vec![0.5, 2.0]).unwrap();
let mut rng = SmallRng::seed_from_u64(7);
let candidate = walk.sample(&[0.0, 0.0], &mut rng);
assert_eq!(candidate.len(), 2);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianRandomWalk<T> {
    stepsize: Vec<T>,
}

impl<T: Float> GaussianRandomWalk<T> {
    /// Builds the walk from one shared or several per-dimension standard
    /// deviations, all of which must be positive and finite.
    pub fn new(stepsize: Vec<T>) -> Result<Self, ConfigError> {
        if stepsize.is_empty() {
            return Err(ConfigError::StepsizeLength {
                expected: 1,
                got: 0,
            });
        }
        if let Some(&bad) = stepsize
            .iter()
            .find(|s| !(s.is_finite() && **s > T::zero()))
        {
            return Err(ConfigError::NonPositive {
                name: "stepsize",
                value: bad.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(Self { stepsize })
    }

    /// Same standard deviation in every dimension.
    pub fn isotropic(std: T) -> Result<Self, ConfigError> {
        Self::new(vec![std])
    }

    /// Standard deviation used for coordinate `i`.
    pub fn std_for(&self, i: usize) -> T {
        if self.stepsize.len() == 1 {
            self.stepsize[0]
        } else {
            self.stepsize[i]
        }
    }

    pub fn stepsize(&self) -> &[T] {
        &self.stepsize
    }
}

impl<T: Float> Proposal<T> for GaussianRandomWalk<T>
where
    StandardNormal: rand_distr::Distribution<T>,
{
    fn sample<R: Rng + ?Sized>(&self, current: &[T], rng: &mut R) -> Vec<T> {
        current
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let z: T = rng.sample(StandardNormal);
                x + self.std_for(i) * z
            })
            .collect()
    }
}

/// Isotropic Gaussian centred at the origin; energy `|x|^2 / (2 std^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotropicGaussian<T> {
    pub std: T,
}

impl<T: Float> IsotropicGaussian<T> {
    pub fn new(std: T) -> Self {
        Self { std }
    }
}

impl<T: Float> Energy<T> for IsotropicGaussian<T> {
    fn energy(&self, x: &[T]) -> T {
        let two = T::one() + T::one();
        x.iter().fold(T::zero(), |acc, &v| acc + v * v) / (two * self.std * self.std)
    }
}

/**
A 2D Gaussian parameterised by a mean vector and a 2x2 covariance matrix.

# Examples

```rust
use samc::distributions::{Energy, Gaussian2D};
use ndarray::{arr1, arr2};

let gauss = Gaussian2D {
    mean: arr1(&[0.0, 0.0]),
    cov: arr2(&[[1.0, 0.0], [0.0, 1.0]]),
};
assert_eq!(gauss.energy(&[1.0, -1.0]), 1.0);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian2D<T> {
    pub mean: Array1<T>,
    pub cov: Array2<T>,
}

impl<T: Float> Gaussian2D<T> {
    /// Normalised log-density, for diagnostics.
    pub fn log_prob(&self, x: &[T]) -> T {
        let det = self.det();
        let two_pi = T::from(2.0 * PI).unwrap_or_else(T::one);
        let half = T::from(0.5).unwrap_or_else(T::zero);
        -two_pi.ln() - half * det.abs().ln() - self.energy(x)
    }

    fn det(&self) -> T {
        self.cov[(0, 0)] * self.cov[(1, 1)] - self.cov[(0, 1)] * self.cov[(1, 0)]
    }
}

impl<T: Float> Energy<T> for Gaussian2D<T> {
    fn energy(&self, x: &[T]) -> T {
        let (a, b, c, d) = (
            self.cov[(0, 0)],
            self.cov[(0, 1)],
            self.cov[(1, 0)],
            self.cov[(1, 1)],
        );
        let det = a * d - b * c;
        let dx = x[0] - self.mean[0];
        let dy = x[1] - self.mean[1];
        // (x - mu)^T Sigma^-1 (x - mu) with the 2x2 adjugate
        let quad = (d * dx * dx - (b + c) * dx * dy + a * dy * dy) / det;
        quad / (T::one() + T::one())
    }
}

/**
A mixture of isotropic Gaussians with a shared standard deviation.

Well separated components make this a classic trap for plain Metropolis
samplers.

# Examples

```rust
use samc::distributions::{Energy, GaussianMixture};

let mixture = GaussianMixture::<f64>::new(vec![vec![-4.0], vec![4.0]], vec![0.5, 0.5], 0.5);
assert!((mixture.energy(&[-4.0]) - mixture.energy(&[4.0])).abs() < 1e-12);
assert!(mixture.energy(&[0.0]) > mixture.energy(&[4.0]));
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianMixture<T> {
    pub means: Vec<Vec<T>>,
    pub weights: Vec<T>,
    pub std: T,
}

impl<T: Float> GaussianMixture<T> {
    pub fn new(means: Vec<Vec<T>>, weights: Vec<T>, std: T) -> Self {
        Self {
            means,
            weights,
            std,
        }
    }
}

impl<T: Float> Energy<T> for GaussianMixture<T> {
    fn energy(&self, x: &[T]) -> T {
        let two = T::one() + T::one();
        let var = self.std * self.std;
        let log_terms: Vec<T> = self
            .means
            .iter()
            .zip(&self.weights)
            .map(|(mu, &w)| {
                let sq = mu
                    .iter()
                    .zip(x)
                    .fold(T::zero(), |acc, (&m, &v)| acc + (v - m) * (v - m));
                w.ln() - sq / (two * var)
            })
            .collect();
        let max = log_terms
            .iter()
            .copied()
            .fold(T::neg_infinity(), T::max);
        if max == T::neg_infinity() {
            return T::infinity();
        }
        let sum = log_terms
            .iter()
            .fold(T::zero(), |acc, &l| acc + (l - max).exp());
        -(max + sum.ln())
    }
}
