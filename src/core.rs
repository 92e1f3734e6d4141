//! The [`MarkovChain`] abstraction and helpers that drive a chain for a fixed
//! number of steps, recording every state in an `n_steps x dim` array.

use indicatif::ProgressBar;
use ndarray::{s, Array2, ArrayView1};
use num_traits::Zero;
use std::time::{Duration, Instant};

use crate::error::Result;

const UPDATE_INTERVAL: Duration = Duration::from_millis(500);

pub trait MarkovChain<S> {
    /// Does one iteration of the chain, returning the new current state.
    fn step(&mut self) -> Result<&Vec<S>>;

    /// Get the current state without stepping.
    fn current_state(&self) -> &Vec<S>;

    /// Short status line shown next to a progress bar.
    fn progress_message(&self) -> String {
        String::new()
    }
}

/// Runs `n_steps` iterations and returns the visited states, one per row.
pub fn run_chain<S, M>(chain: &mut M, n_steps: usize) -> Result<Array2<S>>
where
    M: MarkovChain<S>,
    S: Clone + Zero,
{
    run_chain_while(chain, n_steps, |_| true)
}

/**
Runs up to `n_steps` iterations, asking `keep_going(completed)` before each
one. When it returns `false` the rows recorded so far are returned and no
further iteration is started.

An error from [`MarkovChain::step`] aborts the run and is propagated.
*/
pub fn run_chain_while<S, M, F>(
    chain: &mut M,
    n_steps: usize,
    mut keep_going: F,
) -> Result<Array2<S>>
where
    M: MarkovChain<S>,
    S: Clone + Zero,
    F: FnMut(usize) -> bool,
{
    let dim = chain.current_state().len();
    let mut out = Array2::<S>::zeros((n_steps, dim));

    for i in 0..n_steps {
        if !keep_going(i) {
            return Ok(out.slice(s![..i, ..]).to_owned());
        }
        let state = chain.step()?;
        out.row_mut(i).assign(&ArrayView1::from(state.as_slice()));
    }

    Ok(out)
}

/// Like [`run_chain`], updating `pb` as it goes. The bar message is refreshed
/// from [`MarkovChain::progress_message`] about every 500 milliseconds.
pub fn run_chain_with_progress<S, M>(
    chain: &mut M,
    n_steps: usize,
    pb: &ProgressBar,
) -> Result<Array2<S>>
where
    M: MarkovChain<S>,
    S: Clone + Zero,
{
    let dim = chain.current_state().len();
    let mut out = Array2::<S>::zeros((n_steps, dim));
    let mut last_update = Instant::now();

    pb.set_length(n_steps as u64);

    for i in 0..n_steps {
        let state = chain.step()?;
        out.row_mut(i).assign(&ArrayView1::from(state.as_slice()));

        if last_update.elapsed() >= UPDATE_INTERVAL || i + 1 == n_steps {
            pb.set_position(i as u64 + 1);
            pb.set_message(chain.progress_message());
            last_update = Instant::now();
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SamcError;

    /// Counts upwards in every coordinate.
    struct Counter {
        state: Vec<f64>,
        fail_at: Option<f64>,
    }

    impl MarkovChain<f64> for Counter {
        fn step(&mut self) -> Result<&Vec<f64>> {
            self.state.iter_mut().for_each(|x| *x += 1.0);
            if Some(self.state[0]) == self.fail_at {
                return Err(SamcError::InvalidEnergyResult {
                    iteration: self.state[0] as usize,
                    candidate: self.state.clone(),
                });
            }
            Ok(&self.state)
        }

        fn current_state(&self) -> &Vec<f64> {
            &self.state
        }
    }

    #[test]
    fn records_one_row_per_step() {
        let mut chain = Counter {
            state: vec![0.0, 10.0],
            fail_at: None,
        };
        let out = run_chain(&mut chain, 3).unwrap();
        assert_eq!(out, ndarray::arr2(&[[1.0, 11.0], [2.0, 12.0], [3.0, 13.0]]));
    }

    #[test]
    fn stopping_early_keeps_completed_rows() {
        let mut chain = Counter {
            state: vec![0.0],
            fail_at: None,
        };
        let out = run_chain_while(&mut chain, 10, |done| done < 4).unwrap();
        assert_eq!(out.nrows(), 4);
        assert_eq!(out[(3, 0)], 4.0);
        assert_eq!(chain.state, vec![4.0]);
    }

    #[test]
    fn step_errors_abort_the_run() {
        let mut chain = Counter {
            state: vec![0.0],
            fail_at: Some(2.0),
        };
        let err = run_chain(&mut chain, 5).unwrap_err();
        assert!(matches!(err, SamcError::InvalidEnergyResult { iteration: 2, .. }));
    }

    #[test]
    fn progress_run_matches_plain_run() {
        let mut a = Counter {
            state: vec![0.0],
            fail_at: None,
        };
        let mut b = Counter {
            state: vec![0.0],
            fail_at: None,
        };
        let pb = ProgressBar::hidden();
        let with_bar = run_chain_with_progress(&mut a, 7, &pb).unwrap();
        assert_eq!(with_bar, run_chain(&mut b, 7).unwrap());
        assert_eq!(pb.position(), 7);
    }
}
