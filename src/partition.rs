/*!
Partitioning of energy space into contiguous bins.

A partition is given by `m + 1` strictly increasing breakpoints
`b_0 < b_1 < ... < b_m`; bin `i` covers `[b_i, b_{i+1})`. The outer
breakpoints may be infinite. Energies below `b_0` fall into bin `0` and
energies at or above `b_{m-1}` fall into bin `m - 1`.

# Examples

```rust
use samc::partition::EnergyPartition;

let inf = f64::INFINITY;
let partition = EnergyPartition::new(vec![-inf, -5.0, 0.0, 5.0, inf]).unwrap();
assert_eq!(partition.n_bins(), 4);
assert_eq!(partition.index_of(-7.0), 0);
assert_eq!(partition.index_of(0.0), 2);
assert_eq!(partition.index_of(1e9), 3);
```
*/

use num_traits::Float;

use crate::error::{as_f64, ConfigError};

/// Ordered breakpoints defining `m` energy bins.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyPartition<T> {
    breakpoints: Vec<T>,
}

impl<T: Float> EnergyPartition<T> {
    /// Builds a partition, checking that there are at least two breakpoints
    /// and that they are strictly increasing (NaN is never accepted).
    pub fn new(breakpoints: Vec<T>) -> Result<Self, ConfigError> {
        if breakpoints.len() < 2 {
            return Err(ConfigError::TooFewBreakpoints(breakpoints.len()));
        }
        if let Some(index) = breakpoints.iter().position(|b| b.is_nan()) {
            return Err(ConfigError::UnsortedPartition { index });
        }
        if let Some(index) = breakpoints.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnsortedPartition { index: index + 1 });
        }
        Ok(Self { breakpoints })
    }

    /// Number of bins `m`.
    pub fn n_bins(&self) -> usize {
        self.breakpoints.len() - 1
    }

    pub fn breakpoints(&self) -> &[T] {
        &self.breakpoints
    }

    /// Lower and upper breakpoint of bin `index`.
    pub fn bounds(&self, index: usize) -> (T, T) {
        (self.breakpoints[index], self.breakpoints[index + 1])
    }

    /**
    Returns the bin containing `energy`.

    Bins are left-closed, so an energy equal to a breakpoint `b_i` lands in
    bin `i`. Only the interior breakpoints `b_1..b_{m-1}` are searched, which
    clamps out-of-range energies to the first or last bin. Runs in
    `O(log m)`.
    */
    pub fn index_of(&self, energy: T) -> usize {
        let interior = &self.breakpoints[1..self.breakpoints.len() - 1];
        interior.partition_point(|&b| b <= energy)
    }

    /// Breakpoints as `f64`, for reporting.
    pub fn breakpoints_f64(&self) -> Vec<f64> {
        self.breakpoints.iter().copied().map(as_f64).collect()
    }
}
