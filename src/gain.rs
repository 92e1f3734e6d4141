/*!
Gain sequences for the stochastic-approximation recursion.

A gain sequence `gamma_t` must be positive and non-increasing, with
`sum gamma_t = inf` and `sum gamma_t^2 < inf` for the bias estimates to
converge. [`PolynomialGain`] provides the usual `t0 / max(t0, t)^xi`
form; any `Fn(usize) -> T` can be used in its place.

# Examples

```rust
use samc::gain::{GainSchedule, PolynomialGain};

let gain = PolynomialGain::new(10.0, 0.8);
assert_eq!(gain.gain(1), gain.gain(10));
assert!(gain.gain(11) < gain.gain(10));

// A closure works as well.
let harmonic = |t: usize| 1.0 / t as f64;
assert_eq!(harmonic.gain(4), 0.25);
```
*/

use num_traits::Float;

/// A step-size sequence indexed by the 1-based iteration `t`.
pub trait GainSchedule<T> {
    fn gain(&self, t: usize) -> T;
}

impl<T, F> GainSchedule<T> for F
where
    F: Fn(usize) -> T,
{
    fn gain(&self, t: usize) -> T {
        self(t)
    }
}

/// `gain(t) = t0 / max(t0, t)^xi`.
///
/// Constant at `t0^(1 - xi)` while `t <= t0`, then decays like `t^-xi`.
/// Any `xi` in `(0.5, 1]` satisfies the convergence conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialGain<T> {
    pub t0: T,
    pub xi: T,
}

impl<T: Float> PolynomialGain<T> {
    pub fn new(t0: T, xi: T) -> Self {
        Self { t0, xi }
    }
}

impl<T: Float> GainSchedule<T> for PolynomialGain<T> {
    fn gain(&self, t: usize) -> T {
        let t = T::from(t).unwrap_or_else(T::infinity);
        self.t0 / self.t0.max(t).powf(self.xi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn flat_then_polynomial_decay() {
        let g = PolynomialGain::new(200.0, 2.0 / 3.0);
        let plateau = 200f64.powf(1.0 / 3.0);
        assert_relative_eq!(g.gain(1), plateau, epsilon = 1e-12);
        assert_relative_eq!(g.gain(200), plateau, epsilon = 1e-12);
        assert_relative_eq!(g.gain(1000), 200.0 / 1000f64.powf(2.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn unit_scale_starts_at_one() {
        let g = PolynomialGain::new(1.0f32, 0.8);
        assert_eq!(g.gain(1), 1.0);
        assert_relative_eq!(g.gain(32), 0.0625, epsilon = 1e-6);
    }

    #[test]
    fn closures_are_schedules() {
        let constant = |_t: usize| 0.1f64;
        assert_eq!(constant.gain(1), constant.gain(1_000_000));
    }

    proptest! {
        #[test]
        fn gain_is_positive_and_non_increasing(
            t0 in 0.1f64..1000.0,
            xi in 0.51f64..1.0,
            t in 1usize..1_000_000,
        ) {
            let g = PolynomialGain::new(t0, xi);
            prop_assert!(g.gain(t) > 0.0);
            prop_assert!(g.gain(t + 1) <= g.gain(t));
        }
    }
}
