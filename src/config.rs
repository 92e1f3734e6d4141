/*!
Sampler configuration.

[`SamcConfig`] is the fully-populated record the sampler runs on. It is
normally produced by [`SamcConfigBuilder`], which fills in defaults for
everything except the dimension and the energy partition, and validates
the result.

# Examples

```rust
use samc::config::SamcConfig;
use ndarray::{arr1, arr2};

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
assert_eq!(config.n_bins(), 4);
assert_eq!(config.vecpi, arr1(&[0.25, 0.25, 0.25, 0.25]));
```
*/

use ndarray::{Array1, Array2};
use num_traits::Float;

use crate::distributions::GaussianRandomWalk;
use crate::domain::{DomainGuard, Interval};
use crate::error::{as_f64, ConfigError};
use crate::gain::PolynomialGain;
use crate::partition::EnergyPartition;
use crate::theta::ThetaUpdater;

/// Default number of iterations.
pub const DEFAULT_NITER: usize = 20_000;
/// Default gain-sequence scale.
pub const DEFAULT_T0: f64 = 200.0;
/// Default gain-sequence exponent.
pub const DEFAULT_XI: f64 = 2.0 / 3.0;
/// Default random-walk standard deviation.
pub const DEFAULT_STEPSIZE: f64 = 0.25;

/// Relative tolerance on `sum(vecpi) == 1`.
const VECPI_TOLERANCE: f64 = 1e-6;

/// A complete, validated set of sampler options.
#[derive(Debug, Clone, PartialEq)]
pub struct SamcConfig<T> {
    /// Dimensionality of the sample space.
    pub nv: usize,
    /// `nv x 2` matrix of `[low, high]` per dimension; bounds may be infinite.
    pub domain: Array2<T>,
    /// `m + 1` strictly increasing energy breakpoints.
    pub partition: Array1<T>,
    /// Desired visiting distribution over the `m` bins.
    pub vecpi: Array1<T>,
    /// Temperature.
    pub tau: T,
    /// Number of iterations.
    pub niter: usize,
    /// Gain-sequence scale.
    pub t0: T,
    /// Gain-sequence exponent, in `(0.5, 1]`.
    pub xi: T,
    /// Random-walk standard deviation: one shared value or one per dimension.
    pub stepsize: Array1<T>,
    /// `m x 2` clamping ranges for `theta`.
    pub trange: Array2<T>,
}

impl<T: Float> SamcConfig<T> {
    /// Starts a builder for an `nv`-dimensional problem on the given partition.
    pub fn builder(nv: usize, partition: Array1<T>) -> SamcConfigBuilder<T> {
        SamcConfigBuilder::new(nv, partition)
    }

    /// Number of energy bins `m`.
    pub fn n_bins(&self) -> usize {
        self.partition.len().saturating_sub(1)
    }

    /// Checks every structural invariant the sampler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.components().map(|_| ())
    }

    pub(crate) fn energy_partition(&self) -> Result<EnergyPartition<T>, ConfigError> {
        EnergyPartition::new(self.partition.to_vec())
    }

    pub(crate) fn domain_guard(&self) -> Result<DomainGuard<T>, ConfigError> {
        if self.nv == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.domain.ncols() != 2 {
            return Err(ConfigError::DomainColumns(self.domain.ncols()));
        }
        if self.domain.nrows() != self.nv {
            return Err(ConfigError::DomainRows {
                expected: self.nv,
                got: self.domain.nrows(),
            });
        }
        DomainGuard::new(rows_to_intervals(&self.domain))
    }

    pub(crate) fn random_walk(&self) -> Result<GaussianRandomWalk<T>, ConfigError> {
        let n = self.stepsize.len();
        if n != 1 && n != self.nv {
            return Err(ConfigError::StepsizeLength {
                expected: self.nv,
                got: n,
            });
        }
        GaussianRandomWalk::new(self.stepsize.to_vec())
    }

    pub(crate) fn theta_updater(&self) -> Result<ThetaUpdater<T>, ConfigError> {
        let m = self.n_bins();
        if self.vecpi.len() != m {
            return Err(ConfigError::VecpiLength {
                expected: m,
                got: self.vecpi.len(),
            });
        }
        let sum = self.vecpi.iter().fold(T::zero(), |acc, &p| acc + p);
        let sum_ok = (as_f64(sum) - 1.0).abs() <= VECPI_TOLERANCE;
        if !sum_ok || self.vecpi.iter().any(|p| !(*p > T::zero())) {
            return Err(ConfigError::InvalidVecpi { sum: as_f64(sum) });
        }
        if self.trange.ncols() != 2 {
            return Err(ConfigError::TrangeColumns(self.trange.ncols()));
        }
        if self.trange.nrows() != m {
            return Err(ConfigError::TrangeRows {
                expected: m,
                got: self.trange.nrows(),
            });
        }
        ThetaUpdater::new(self.vecpi.to_vec(), rows_to_intervals(&self.trange))
    }

    pub(crate) fn polynomial_gain(&self) -> Result<PolynomialGain<T>, ConfigError> {
        check_positive("t0", self.t0)?;
        let xi = as_f64(self.xi);
        if !(xi > 0.5 && xi <= 1.0) {
            return Err(ConfigError::InvalidXi(xi));
        }
        Ok(PolynomialGain::new(self.t0, self.xi))
    }

    /// Builds every component, failing on the first violated invariant.
    #[allow(clippy::type_complexity)]
    pub(crate) fn components(
        &self,
    ) -> Result<
        (
            DomainGuard<T>,
            EnergyPartition<T>,
            GaussianRandomWalk<T>,
            ThetaUpdater<T>,
            PolynomialGain<T>,
        ),
        ConfigError,
    > {
        if self.niter == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        check_positive("tau", self.tau)?;
        let domain = self.domain_guard()?;
        let partition = self.energy_partition()?;
        let walk = self.random_walk()?;
        let theta = self.theta_updater()?;
        let gain = self.polynomial_gain()?;
        Ok((domain, partition, walk, theta, gain))
    }
}

fn rows_to_intervals<T: Float>(m: &Array2<T>) -> Vec<Interval<T>> {
    m.rows()
        .into_iter()
        .map(|row| Interval::new(row[0], row[1]))
        .collect()
}

fn check_positive<T: Float>(name: &'static str, value: T) -> Result<(), ConfigError> {
    if value.is_finite() && value > T::zero() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            name,
            value: as_f64(value),
        })
    }
}

/**
Defaulting stage for [`SamcConfig`].

Unset options take these values:

| option | default |
|---|---|
| `domain` | `(-inf, inf)` in every dimension |
| `vecpi` | uniform, `1 / m` |
| `tau` | `1` |
| `niter` | `20000` |
| `t0` | `200` |
| `xi` | `2 / 3` |
| `stepsize` | `0.25` in every dimension |
| `trange` | `(-inf, inf)` for every bin, i.e. no clamping |
*/
#[derive(Debug, Clone)]
pub struct SamcConfigBuilder<T> {
    nv: usize,
    partition: Array1<T>,
    domain: Option<Array2<T>>,
    vecpi: Option<Array1<T>>,
    tau: Option<T>,
    niter: Option<usize>,
    t0: Option<T>,
    xi: Option<T>,
    stepsize: Option<Array1<T>>,
    trange: Option<Array2<T>>,
}

impl<T: Float> SamcConfigBuilder<T> {
    pub fn new(nv: usize, partition: Array1<T>) -> Self {
        Self {
            nv,
            partition,
            domain: None,
            vecpi: None,
            tau: None,
            niter: None,
            t0: None,
            xi: None,
            stepsize: None,
            trange: None,
        }
    }

    pub fn domain(mut self, domain: Array2<T>) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn vecpi(mut self, vecpi: Array1<T>) -> Self {
        self.vecpi = Some(vecpi);
        self
    }

    pub fn tau(mut self, tau: T) -> Self {
        self.tau = Some(tau);
        self
    }

    pub fn niter(mut self, niter: usize) -> Self {
        self.niter = Some(niter);
        self
    }

    pub fn t0(mut self, t0: T) -> Self {
        self.t0 = Some(t0);
        self
    }

    pub fn xi(mut self, xi: T) -> Self {
        self.xi = Some(xi);
        self
    }

    pub fn stepsize(mut self, stepsize: Array1<T>) -> Self {
        self.stepsize = Some(stepsize);
        self
    }

    pub fn trange(mut self, trange: Array2<T>) -> Self {
        self.trange = Some(trange);
        self
    }

    /// Fills in defaults and validates the result.
    pub fn build(self) -> Result<SamcConfig<T>, ConfigError> {
        let m = self.partition.len().saturating_sub(1);
        let unbounded = |rows: usize| {
            Array2::from_shape_fn((rows, 2), |(_, j)| {
                if j == 0 {
                    T::neg_infinity()
                } else {
                    T::infinity()
                }
            })
        };
        let cast = |x: f64| T::from(x).unwrap_or_else(T::nan);
        let uniform = T::one() / T::from(m.max(1)).unwrap_or_else(T::one);

        let config = SamcConfig {
            nv: self.nv,
            domain: self.domain.unwrap_or_else(|| unbounded(self.nv)),
            vecpi: self.vecpi.unwrap_or_else(|| Array1::from_elem(m, uniform)),
            tau: self.tau.unwrap_or_else(T::one),
            niter: self.niter.unwrap_or(DEFAULT_NITER),
            t0: self.t0.unwrap_or_else(|| cast(DEFAULT_T0)),
            xi: self.xi.unwrap_or_else(|| cast(DEFAULT_XI)),
            stepsize: self
                .stepsize
                .unwrap_or_else(|| Array1::from_elem(1, cast(DEFAULT_STEPSIZE))),
            trange: self.trange.unwrap_or_else(|| unbounded(m)),
            partition: self.partition,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn four_bins() -> Array1<f64> {
        arr1(&[f64::NEG_INFINITY, -5.0, 0.0, 5.0, f64::INFINITY])
    }

    #[test]
    fn builder_fills_defaults() {
        let config = SamcConfig::builder(2, four_bins()).build().unwrap();
        assert_eq!(config.nv, 2);
        assert_eq!(config.domain.shape(), &[2, 2]);
        assert!(config.domain.iter().all(|b| b.is_infinite()));
        assert_eq!(config.vecpi, arr1(&[0.25; 4]));
        assert_eq!(config.tau, 1.0);
        assert_eq!(config.niter, DEFAULT_NITER);
        assert_eq!(config.t0, DEFAULT_T0);
        assert_eq!(config.xi, DEFAULT_XI);
        assert_eq!(config.stepsize, arr1(&[DEFAULT_STEPSIZE]));
        assert_eq!(config.trange.shape(), &[4, 2]);
        assert_eq!(config.trange[(3, 0)], f64::NEG_INFINITY);
    }

    #[test]
    fn builder_keeps_overrides() {
        let config = SamcConfig::builder(1, arr1(&[0.0f32, 1.0, 2.0]))
            .domain(arr2(&[[0.0, 1.0]]))
            .vecpi(arr1(&[0.75, 0.25]))
            .tau(2.0)
            .niter(10)
            .t0(5.0)
            .xi(1.0)
            .stepsize(arr1(&[0.1]))
            .trange(arr2(&[[-1.0, 1.0], [-2.0, 2.0]]))
            .build()
            .unwrap();
        assert_eq!(config.vecpi, arr1(&[0.75, 0.25]));
        assert_eq!(config.tau, 2.0);
        assert_eq!(config.niter, 10);
        assert_eq!(config.n_bins(), 2);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let err = SamcConfig::builder(2, four_bins())
            .domain(arr2(&[[0.0, 1.0]]))
            .build();
        assert_eq!(
            err,
            Err(ConfigError::DomainRows {
                expected: 2,
                got: 1
            })
        );

        let err = SamcConfig::builder(1, four_bins())
            .vecpi(arr1(&[0.5, 0.5]))
            .build();
        assert_eq!(
            err,
            Err(ConfigError::VecpiLength {
                expected: 4,
                got: 2
            })
        );

        let err = SamcConfig::builder(1, four_bins())
            .trange(arr2(&[[-1.0, 1.0]; 3]))
            .build();
        assert_eq!(
            err,
            Err(ConfigError::TrangeRows {
                expected: 4,
                got: 3
            })
        );

        let err = SamcConfig::builder(3, four_bins())
            .stepsize(arr1(&[0.1, 0.2]))
            .build();
        assert_eq!(
            err,
            Err(ConfigError::StepsizeLength {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn rejects_bad_values() {
        let err = SamcConfig::builder(1, four_bins())
            .vecpi(arr1(&[0.5, 0.5, 0.0, 0.0]))
            .build();
        assert!(matches!(err, Err(ConfigError::InvalidVecpi { .. })));

        let err = SamcConfig::builder(1, four_bins())
            .vecpi(arr1(&[0.5, 0.5, 0.5, 0.5]))
            .build();
        assert_eq!(err, Err(ConfigError::InvalidVecpi { sum: 2.0 }));

        let err = SamcConfig::builder(1, four_bins()).xi(0.5).build();
        assert_eq!(err, Err(ConfigError::InvalidXi(0.5)));

        let err = SamcConfig::builder(1, four_bins()).tau(0.0).build();
        assert_eq!(
            err,
            Err(ConfigError::NonPositive {
                name: "tau",
                value: 0.0
            })
        );

        let err = SamcConfig::builder(1, four_bins()).niter(0).build();
        assert_eq!(err, Err(ConfigError::ZeroIterations));

        let err = SamcConfig::builder(0, four_bins()).build();
        assert_eq!(err, Err(ConfigError::ZeroDimension));

        let err = SamcConfig::builder(1, arr1(&[0.0, 1.0, 1.0])).build();
        assert_eq!(err, Err(ConfigError::UnsortedPartition { index: 2 }));
    }

    #[test]
    fn validate_catches_edits_after_build() {
        let mut config = SamcConfig::builder(1, four_bins()).build().unwrap();
        assert!(config.validate().is_ok());
        config.trange = arr2(&[[1.0, -1.0]; 4]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTrange { index: 0, .. })
        ));
    }
}
