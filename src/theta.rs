/*!
The per-partition bias vector `theta` and its stochastic-approximation update.

After each iteration, with `J` the partition of the (post-decision) current
point and `gamma` the gain for that iteration,

```text
theta_j <- clamp(theta_j + gamma * (1[j == J] - pi_j), trange_j)
```

for every partition `j`. Partitions visited more often than their target
share `pi_j` gain weight in `theta`, which the acceptance rule turns into a
penalty for staying there.
*/

use num_traits::Float;

use crate::domain::Interval;
use crate::error::{as_f64, ConfigError};

/// Owns `theta` together with the target distribution `vecpi` and the
/// clamping ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ThetaUpdater<T> {
    theta: Vec<T>,
    vecpi: Vec<T>,
    trange: Vec<Interval<T>>,
}

impl<T: Float> ThetaUpdater<T> {
    /// Starts from `theta = 0`. `vecpi` and `trange` must have the same
    /// length and every range must satisfy `low <= high`.
    pub fn new(vecpi: Vec<T>, trange: Vec<Interval<T>>) -> Result<Self, ConfigError> {
        if trange.len() != vecpi.len() {
            return Err(ConfigError::TrangeRows {
                expected: vecpi.len(),
                got: trange.len(),
            });
        }
        if let Some((index, r)) = trange
            .iter()
            .enumerate()
            .find(|(_, r)| r.low.is_nan() || r.high.is_nan() || r.low > r.high)
        {
            return Err(ConfigError::InvalidTrange {
                index,
                low: as_f64(r.low),
                high: as_f64(r.high),
            });
        }
        Ok(Self {
            theta: vec![T::zero(); vecpi.len()],
            vecpi,
            trange,
        })
    }

    /// Applies one recursion step for an iteration that ended in partition
    /// `visited` using step size `gain`.
    pub fn update(&mut self, gain: T, visited: usize) {
        for (j, ((theta, &pi), range)) in self
            .theta
            .iter_mut()
            .zip(&self.vecpi)
            .zip(&self.trange)
            .enumerate()
        {
            let hit = if j == visited { T::one() } else { T::zero() };
            *theta = (*theta + gain * (hit - pi)).max(range.low).min(range.high);
        }
    }
}

impl<T> ThetaUpdater<T> {
    pub fn theta(&self) -> &[T] {
        &self.theta
    }

    pub fn vecpi(&self) -> &[T] {
        &self.vecpi
    }

    pub fn trange(&self) -> &[Interval<T>] {
        &self.trange
    }

    /// Number of partitions `m`.
    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }
}
