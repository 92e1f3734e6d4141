//! Running statistics for monitoring a chain while it samples.

use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::collections::VecDeque;

/// Default number of recent iterations used for the acceptance rate.
pub const DEFAULT_WINDOW: usize = 100;

/// Tracks a windowed acceptance rate, the running mean of the state, and the
/// visit counts per energy partition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTracker {
    n: u64,
    window: usize,
    accept_queue: VecDeque<bool>,
    accepted_in_window: usize,
    mean: Array1<f64>,
    visits: Array1<u64>,
}

/// Snapshot of a [`ChainTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    pub n: u64,
    pub p_accept: f64,
    pub mean: Array1<f64>,
    pub visit_proportions: Array1<f64>,
}

impl ChainTracker {
    pub fn new(n_params: usize, n_bins: usize) -> Self {
        Self::with_window(n_params, n_bins, DEFAULT_WINDOW)
    }

    pub fn with_window(n_params: usize, n_bins: usize, window: usize) -> Self {
        Self {
            n: 0,
            window: window.max(1),
            accept_queue: VecDeque::with_capacity(window.max(1)),
            accepted_in_window: 0,
            mean: Array1::zeros(n_params),
            visits: Array1::zeros(n_bins),
        }
    }

    /// Records one iteration ending at state `x` in partition `partition`.
    pub fn step<T: ToPrimitive>(&mut self, x: &[T], accepted: bool, partition: usize) {
        self.n += 1;

        self.accept_queue.push_back(accepted);
        self.accepted_in_window += usize::from(accepted);
        if self.accept_queue.len() > self.window {
            if let Some(true) = self.accept_queue.pop_front() {
                self.accepted_in_window -= 1;
            }
        }

        let n = self.n as f64;
        for (m, v) in self.mean.iter_mut().zip(x) {
            let v = v.to_f64().unwrap_or(f64::NAN);
            *m += (v - *m) / n;
        }

        if let Some(count) = self.visits.get_mut(partition) {
            *count += 1;
        }
    }

    /// Acceptance rate over the most recent `window` iterations.
    pub fn p_accept(&self) -> f64 {
        if self.accept_queue.is_empty() {
            0.0
        } else {
            self.accepted_in_window as f64 / self.accept_queue.len() as f64
        }
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Fraction of tracked iterations spent in each partition.
    pub fn visit_proportions(&self) -> Array1<f64> {
        if self.n == 0 {
            return Array1::zeros(self.visits.len());
        }
        self.visits.mapv(|c| c as f64 / self.n as f64)
    }

    /// Number of partitions visited at least once.
    pub fn n_visited(&self) -> usize {
        self.visits.iter().filter(|&&c| c > 0).count()
    }

    pub fn stats(&self) -> ChainStats {
        ChainStats {
            n: self.n,
            p_accept: self.p_accept(),
            mean: self.mean.clone(),
            visit_proportions: self.visit_proportions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn acceptance_rate_uses_window() {
        let mut tracker = ChainTracker::with_window(1, 2, 4);
        for accepted in [true, true, true, true, false, false] {
            tracker.step(&[0.0], accepted, 0);
        }
        // window now holds [true, true, false, false]
        assert_eq!(tracker.p_accept(), 0.5);
        assert_eq!(tracker.stats().n, 6);
    }

    #[test]
    fn running_mean_and_visits() {
        let mut tracker = ChainTracker::new(2, 3);
        tracker.step(&[1.0f32, 2.0], true, 0);
        tracker.step(&[3.0f32, 4.0], false, 2);
        tracker.step(&[5.0f32, 6.0], true, 2);
        assert_abs_diff_eq!(tracker.mean(), &arr1(&[3.0, 4.0]), epsilon = 1e-12);
        assert_abs_diff_eq!(
            tracker.visit_proportions(),
            arr1(&[1.0 / 3.0, 0.0, 2.0 / 3.0]),
            epsilon = 1e-12
        );
        assert_eq!(tracker.n_visited(), 2);
    }

    #[test]
    fn empty_tracker_reports_zeros() {
        let tracker = ChainTracker::new(1, 2);
        assert_eq!(tracker.p_accept(), 0.0);
        assert_eq!(tracker.visit_proportions(), arr1(&[0.0, 0.0]));
    }
}
