/*!
Per-dimension continuous domain of the sampler.

Each coordinate is restricted to an [`Interval`] whose bounds may be
infinite. Proposals leaving the domain are not reflected or resampled:
the sampler treats them as rejected outright, which keeps the symmetric
random-walk kernel in detailed balance.
*/

use num_traits::Float;

use crate::error::{as_f64, ConfigError};

/// Offset from the finite bound used to start half-bounded coordinates.
const HALF_BOUNDED_OFFSET: f64 = 10.0;

/// A closed interval `[low, high]`; either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    pub low: T,
    pub high: T,
}

impl<T: Float> Interval<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    /// The whole real line.
    pub fn unbounded() -> Self {
        Self::new(T::neg_infinity(), T::infinity())
    }

    /// Returns `true` if `x` lies inside. NaN is never contained.
    pub fn contains(&self, x: T) -> bool {
        self.low <= x && x <= self.high
    }

    /**
    Starting coordinate for this interval:
    - the midpoint when both bounds are finite,
    - 10 units inside the finite bound when only one bound is finite,
    - `0` when both bounds are infinite.
    */
    pub fn initial_value(&self) -> T {
        let offset = T::from(HALF_BOUNDED_OFFSET).unwrap_or_else(T::one);
        match (self.low.is_finite(), self.high.is_finite()) {
            (true, true) => self.low + (self.high - self.low) / (T::one() + T::one()),
            (true, false) => self.low + offset,
            (false, true) => self.high - offset,
            (false, false) => T::zero(),
        }
    }
}

/// Enforces the sampling domain on proposed points.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainGuard<T> {
    bounds: Vec<Interval<T>>,
}

impl<T: Float> DomainGuard<T> {
    /// Builds a guard from one interval per dimension. Every interval must
    /// satisfy `low < high` and contain no NaN.
    pub fn new(bounds: Vec<Interval<T>>) -> Result<Self, ConfigError> {
        if bounds.is_empty() {
            return Err(ConfigError::ZeroDimension);
        }
        for (index, b) in bounds.iter().enumerate() {
            if b.low.is_nan() || b.high.is_nan() || b.low >= b.high {
                return Err(ConfigError::InvalidDomain {
                    index,
                    low: as_f64(b.low),
                    high: as_f64(b.high),
                });
            }
        }
        Ok(Self { bounds })
    }

    /// An unconstrained domain of dimension `nv`.
    pub fn unbounded(nv: usize) -> Result<Self, ConfigError> {
        Self::new(vec![Interval::unbounded(); nv])
    }

    /// Dimensionality `nv`.
    pub fn nv(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Interval<T>] {
        &self.bounds
    }

    /// Returns `true` if every coordinate of `point` lies in its interval.
    /// A point of the wrong dimension is never admitted.
    pub fn admits(&self, point: &[T]) -> bool {
        point.len() == self.bounds.len()
            && self
                .bounds
                .iter()
                .zip(point)
                .all(|(interval, &x)| interval.contains(x))
    }

    /// The deterministic starting point of a chain.
    pub fn initial_point(&self) -> Vec<T> {
        self.bounds.iter().map(Interval::initial_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_point_follows_bound_kinds() {
        let guard = DomainGuard::new(vec![
            Interval::new(-10.0, 10.0),
            Interval::new(2.0, f64::INFINITY),
            Interval::new(f64::NEG_INFINITY, -3.0),
            Interval::unbounded(),
            Interval::new(1.0, 2.0),
        ])
        .unwrap();
        assert_eq!(guard.initial_point(), vec![0.0, 12.0, -13.0, 0.0, 1.5]);
        assert!(guard.admits(&guard.initial_point()));
    }

    #[test]
    fn admits_respects_closed_finite_bounds() {
        let guard = DomainGuard::new(vec![Interval::new(-1.0f32, 1.0), Interval::unbounded()])
            .unwrap();
        assert!(guard.admits(&[1.0, 1e30]));
        assert!(guard.admits(&[-1.0, -1e30]));
        assert!(!guard.admits(&[1.0001, 0.0]));
        assert!(!guard.admits(&[0.0, f32::NAN]));
        assert!(!guard.admits(&[0.0]));
    }

    #[test]
    fn rejects_inverted_or_empty_domains() {
        assert_eq!(
            DomainGuard::new(vec![Interval::new(0.0, 1.0), Interval::new(2.0, 2.0)]),
            Err(ConfigError::InvalidDomain {
                index: 1,
                low: 2.0,
                high: 2.0
            })
        );
        assert_eq!(
            DomainGuard::<f64>::new(vec![]),
            Err(ConfigError::ZeroDimension)
        );
        assert_eq!(DomainGuard::<f64>::unbounded(3).unwrap().nv(), 3);
    }
}
