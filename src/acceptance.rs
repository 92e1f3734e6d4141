/*!
The bias-corrected Metropolis acceptance rule.

For a move from level `(E, I)` to candidate level `(E', I')` the log
acceptance ratio is

```text
log r = (theta[I] - theta[I']) + (E - E') / tau
```

The random-walk proposal is symmetric, so no proposal-density term appears.
A candidate with infinite energy has `log r = -inf`.
*/

use num_traits::Float;
use rand::Rng;

/// Energy of a point together with the partition it falls into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyLevel<T> {
    pub energy: T,
    pub index: usize,
}

impl<T> EnergyLevel<T> {
    pub fn new(energy: T, index: usize) -> Self {
        Self { energy, index }
    }
}

/// Metropolis rule at temperature `tau`, corrected by `theta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceRule<T> {
    pub tau: T,
}

impl<T: Float> AcceptanceRule<T> {
    pub fn new(tau: T) -> Self {
        Self { tau }
    }

    /// SAMC-adjusted log acceptance ratio.
    ///
    /// An infinite candidate energy yields `-inf`. Leaving a current point of
    /// infinite energy for a finite one yields `+inf`.
    pub fn log_ratio(
        &self,
        current: EnergyLevel<T>,
        candidate: EnergyLevel<T>,
        theta: &[T],
    ) -> T {
        if candidate.energy == T::infinity() {
            return T::neg_infinity();
        }
        if current.energy == T::infinity() {
            return T::infinity();
        }
        (theta[current.index] - theta[candidate.index])
            + (current.energy - candidate.energy) / self.tau
    }

    /**
    Decides a move given its log acceptance ratio.

    `log_ratio >= 0` always accepts. A ratio below `ln(T::min_positive_value())`
    (including `-inf`) is treated as probability zero. Only the remaining
    case draws a single uniform from `rng`.
    */
    pub fn accept<R>(&self, log_ratio: T, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
        rand_distr::Standard: rand_distr::Distribution<T>,
    {
        if log_ratio >= T::zero() {
            return true;
        }
        if log_ratio.is_nan() || log_ratio < T::min_positive_value().ln() {
            return false;
        }
        let u: T = rng.gen();
        u < log_ratio.exp()
    }

    /// Computes the ratio and decides in one call.
    pub fn decide<R>(
        &self,
        current: EnergyLevel<T>,
        candidate: EnergyLevel<T>,
        theta: &[T],
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
        rand_distr::Standard: rand_distr::Distribution<T>,
    {
        self.accept(self.log_ratio(current, candidate, theta), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    /// Fails the test if the rule consumes randomness.
    struct NoDraws;

    impl RngCore for NoDraws {
        fn next_u32(&mut self) -> u32 {
            panic!("unexpected random draw")
        }
        fn next_u64(&mut self) -> u64 {
            panic!("unexpected random draw")
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("unexpected random draw")
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            panic!("unexpected random draw")
        }
    }

    #[test]
    fn equal_levels_accept_without_drawing() {
        let rule = AcceptanceRule::new(1.0);
        let theta = [0.3, 0.3];
        let a = EnergyLevel::new(2.5, 0);
        let b = EnergyLevel::new(2.5, 1);
        assert_eq!(rule.log_ratio(a, b, &theta), 0.0);
        assert!(rule.decide(a, b, &theta, &mut NoDraws));
    }

    #[test]
    fn ratio_combines_theta_and_energy() {
        let rule = AcceptanceRule::new(2.0);
        let theta = [1.0, 4.0];
        let ratio = rule.log_ratio(EnergyLevel::new(3.0, 1), EnergyLevel::new(1.0, 0), &theta);
        assert_eq!(ratio, 3.0 + 1.0);
        let ratio = rule.log_ratio(EnergyLevel::new(1.0, 0), EnergyLevel::new(3.0, 1), &theta);
        assert_eq!(ratio, -3.0 - 1.0);
    }

    #[test]
    fn infinite_candidate_energy_is_never_accepted() {
        let rule = AcceptanceRule::new(1.0);
        let theta = [100.0, -100.0];
        let ratio = rule.log_ratio(
            EnergyLevel::new(0.0, 0),
            EnergyLevel::new(f64::INFINITY, 1),
            &theta,
        );
        assert_eq!(ratio, f64::NEG_INFINITY);
        assert!(!rule.accept(ratio, &mut NoDraws));
    }

    #[test]
    fn leaving_infinite_energy_is_always_accepted() {
        let rule = AcceptanceRule::new(1.0);
        let ratio = rule.log_ratio(
            EnergyLevel::new(f64::INFINITY, 1),
            EnergyLevel::new(1e6, 0),
            &[-50.0, 50.0],
        );
        assert!(rule.accept(ratio, &mut NoDraws));
    }

    #[test]
    fn underflowing_ratio_rejects_without_drawing() {
        let rule = AcceptanceRule::new(1.0f64);
        assert!(!rule.accept(-1000.0, &mut NoDraws));
        assert!(!rule.accept(f64::NAN, &mut NoDraws));
        let rule = AcceptanceRule::new(1.0f32);
        assert!(!rule.accept(-100.0, &mut NoDraws));
    }

    #[test]
    fn acceptance_frequency_matches_exp_ratio() {
        let rule = AcceptanceRule::new(1.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 100_000;
        let log_ratio = 0.25f64.ln();
        let accepted = (0..n).filter(|_| rule.accept(log_ratio, &mut rng)).count();
        let rate = accepted as f64 / n as f64;
        assert!((rate - 0.25).abs() < 0.01, "acceptance rate {rate}");
    }
}
