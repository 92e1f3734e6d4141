/*!
# Stochastic Approximation Monte Carlo

[`Samc`] runs a single self-adjusting Metropolis chain. The energy axis is
cut into partitions, and a bias vector `theta` (one entry per partition) is
learned online so that, in the long run, the chain visits every partition
with the frequency given by `vecpi`. This lets the chain escape local modes
that trap a plain random-walk Metropolis sampler.

Each iteration:

1. draws a Gaussian random-walk candidate,
2. rejects it outright if it leaves the domain, otherwise evaluates its
   energy and partition,
3. accepts or rejects it with the `theta`-corrected Metropolis rule,
4. updates `theta` for the partition the chain ended up in, using the gain
   for this iteration,
5. counts the visit and records the current point.

## Example Usage

```rust
use samc::config::SamcConfig;
use samc::samc::Samc;
use ndarray::{arr1, arr2};

let inf = f64::INFINITY;
let config = SamcConfig::builder(1, arr1(&[-inf, 1.0, 4.0, inf]))
    .domain(arr2(&[[-10.0, 10.0]]))
    .niter(2_000)
    .stepsize(arr1(&[1.0]))
    .build()
    .unwrap();

let energy = |x: &[f64]| x[0] * x[0] / 2.0;
let mut chain = Samc::new(&config, energy).unwrap().set_seed(42);
let output = chain.run().unwrap();

assert_eq!(output.samples.shape(), &[2_000, 1]);
assert_eq!(output.frequency.sum(), 2_000);
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::SummaryStatisticsExt;
use num_traits::{Float, FromPrimitive};
use rand::prelude::*;
use rand_distr::{Standard, StandardNormal};
use tracing::{debug, info, warn};

use crate::acceptance::{AcceptanceRule, EnergyLevel};
use crate::config::SamcConfig;
use crate::core::{run_chain_while, run_chain_with_progress, MarkovChain};
use crate::distributions::{Energy, GaussianRandomWalk, Proposal};
use crate::domain::DomainGuard;
use crate::error::{as_f64, Result, SamcError};
use crate::gain::{GainSchedule, PolynomialGain};
use crate::partition::EnergyPartition;
use crate::stats::ChainTracker;
use crate::theta::ThetaUpdater;

/// Number of debug snapshots logged over one run.
const DEBUG_SNAPSHOTS: usize = 10;

/// The raw result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SamcOutput<T> {
    /// `niter x nv`; row `t` holds the current point after iteration `t`.
    pub samples: Array2<T>,
    /// Visits per partition over the rows of `samples`.
    pub frequency: Array1<u64>,
    /// Bias vector at the end of the run.
    pub theta: Array1<T>,
    /// Partition of every row of `samples`.
    pub labels: Array1<usize>,
    /// Desired visiting distribution the run targeted.
    pub vecpi: Array1<T>,
    /// Accepted moves during the run.
    pub n_accepted: usize,
    /// Candidates rejected for leaving the domain.
    pub n_out_of_domain: usize,
}

impl<T: Float> SamcOutput<T> {
    /// Number of recorded iterations.
    pub fn niter(&self) -> usize {
        self.samples.nrows()
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.niter() == 0 {
            return 0.0;
        }
        self.n_accepted as f64 / self.niter() as f64
    }

    /**
    Estimated probability mass of every partition under the target.

    With `theta` converged, the mass of partition `i` is proportional to
    `vecpi_i * exp(theta_i)`. The estimate is normalised over the partitions
    that were visited; unvisited partitions get `0`.
    */
    pub fn partition_weights(&self) -> Array1<T> {
        let visited = |i: usize| self.frequency[i] > 0;
        let max = (0..self.theta.len())
            .filter(|&i| visited(i))
            .map(|i| self.theta[i])
            .fold(T::neg_infinity(), T::max);
        if max == T::neg_infinity() {
            return Array1::zeros(self.theta.len());
        }
        let unnormalised = Array1::from_shape_fn(self.theta.len(), |i| {
            if visited(i) {
                self.vecpi[i] * (self.theta[i] - max).exp()
            } else {
                T::zero()
            }
        });
        let total = unnormalised.iter().fold(T::zero(), |acc, &w| acc + w);
        unnormalised.mapv(|w| w / total)
    }

    /// Log importance weight of every sample: `theta` of its partition.
    pub fn log_importance_weights(&self) -> Array1<T> {
        self.labels.mapv(|j| self.theta[j])
    }

    /**
    Importance-weighted estimate of the target mean.

    Samples are drawn from the `theta`-flattened distribution, so weighting
    row `t` by `exp(theta[labels[t]])` recovers expectations under the
    original density. Returns `None` for an empty run.
    */
    pub fn weighted_mean(&self) -> Option<Array1<T>>
    where
        T: FromPrimitive,
    {
        let log_w = self.log_importance_weights();
        let max = log_w.iter().copied().fold(T::neg_infinity(), T::max);
        if !max.is_finite() {
            return None;
        }
        let weights = log_w.mapv(|l| (l - max).exp());
        self.samples.weighted_mean_axis(Axis(0), &weights).ok()
    }
}

#[derive(Debug, Clone, Copy)]
struct RunStart {
    n_accepted: usize,
    n_out_of_domain: usize,
}

/**
A single SAMC chain.

Type parameters:
- `T`: the floating-point type (`f32` or `f64`),
- `E`: the energy function, see [`Energy`],
- `G`: the gain schedule, [`PolynomialGain`] unless replaced with
  [`with_gain`](Samc::with_gain),
- `R`: the random number generator, `SmallRng` unless replaced with
  [`with_rng`](Samc::with_rng).

Proposal and acceptance draws share the chain's generator, so a fixed seed
reproduces a run exactly.
*/
#[derive(Debug, Clone)]
pub struct Samc<T, E, G = PolynomialGain<T>, R = SmallRng> {
    energy: E,
    proposal: GaussianRandomWalk<T>,
    domain: DomainGuard<T>,
    partition: EnergyPartition<T>,
    acceptance: AcceptanceRule<T>,
    gain: G,
    theta: ThetaUpdater<T>,
    niter: usize,
    current_state: Vec<T>,
    current: EnergyLevel<T>,
    frequency: Vec<u64>,
    /// Partition labels of the run in progress, if any.
    labels: Option<Vec<usize>>,
    iteration: usize,
    n_accepted: usize,
    n_out_of_domain: usize,
    log_every: usize,
    tracker: ChainTracker,

    /// The chain's random seed.
    pub seed: u64,
    /// The random number generator for this chain.
    pub rng: R,
}

impl<T, E> Samc<T, E>
where
    T: Float,
    E: Energy<T>,
{
    /**
    Creates a chain from a configuration and an energy function.

    The configuration is validated again here. The chain starts at the
    domain's initial point (midpoint, 10 units inside a single finite bound,
    or 0), whose energy is evaluated once; `theta` and the visit counts start
    at zero.

    # Errors

    [`SamcError::DegenerateConfiguration`] for an invalid configuration,
    [`SamcError::InvalidEnergyResult`] if the initial energy is NaN.
    */
    pub fn new(config: &SamcConfig<T>, energy: E) -> Result<Self> {
        let (domain, partition, proposal, theta, gain) = config.components()?;
        let current_state = domain.initial_point();
        let initial_energy = energy.energy(&current_state);
        if initial_energy.is_nan() {
            return Err(SamcError::InvalidEnergyResult {
                iteration: 0,
                candidate: current_state.iter().copied().map(as_f64).collect(),
            });
        }
        let current = EnergyLevel::new(initial_energy, partition.index_of(initial_energy));
        let m = partition.n_bins();
        debug!(
            breakpoints = ?partition.breakpoints_f64(),
            initial_energy = as_f64(initial_energy),
            initial_partition = current.index,
            "initialised SAMC chain"
        );

        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            energy,
            proposal,
            tracker: ChainTracker::new(domain.nv(), m),
            domain,
            partition,
            acceptance: AcceptanceRule::new(config.tau),
            gain,
            theta,
            niter: config.niter,
            current_state,
            current,
            frequency: vec![0; m],
            labels: None,
            iteration: 0,
            n_accepted: 0,
            n_out_of_domain: 0,
            log_every: (config.niter / DEBUG_SNAPSHOTS).max(1),
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl<T, E, G> Samc<T, E, G, SmallRng> {
    /**
    Reseeds the chain's generator, making the run reproducible.

    ```rust
    use samc::config::SamcConfig;
    use samc::samc::Samc;
    use ndarray::arr1;

    let config = SamcConfig::builder(1, arr1(&[f64::NEG_INFINITY, 0.5, f64::INFINITY]))
        .niter(100)
        .build()
        .unwrap();
    let energy = |x: &[f64]| x[0].abs();
    let a = Samc::new(&config, energy).unwrap().set_seed(7).run().unwrap();
    let b = Samc::new(&config, energy).unwrap().set_seed(7).run().unwrap();
    assert_eq!(a, b);
    ```
    */
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }
}

impl<T, E, G, R> Samc<T, E, G, R> {
    /// Replaces the random number generator.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Samc<T, E, G, R2> {
        Samc {
            energy: self.energy,
            proposal: self.proposal,
            domain: self.domain,
            partition: self.partition,
            acceptance: self.acceptance,
            gain: self.gain,
            theta: self.theta,
            niter: self.niter,
            current_state: self.current_state,
            current: self.current,
            frequency: self.frequency,
            labels: self.labels,
            iteration: self.iteration,
            n_accepted: self.n_accepted,
            n_out_of_domain: self.n_out_of_domain,
            log_every: self.log_every,
            tracker: self.tracker,
            seed: self.seed,
            rng,
        }
    }

    /// Replaces the gain schedule built from `t0` and `xi`.
    pub fn with_gain<G2: GainSchedule<T>>(self, gain: G2) -> Samc<T, E, G2, R> {
        Samc {
            energy: self.energy,
            proposal: self.proposal,
            domain: self.domain,
            partition: self.partition,
            acceptance: self.acceptance,
            gain,
            theta: self.theta,
            niter: self.niter,
            current_state: self.current_state,
            current: self.current,
            frequency: self.frequency,
            labels: self.labels,
            iteration: self.iteration,
            n_accepted: self.n_accepted,
            n_out_of_domain: self.n_out_of_domain,
            log_every: self.log_every,
            tracker: self.tracker,
            seed: self.seed,
            rng: self.rng,
        }
    }

    /// Current bias vector.
    pub fn theta(&self) -> &[T] {
        self.theta.theta()
    }

    /// Visits per partition since the chain was created.
    pub fn frequency(&self) -> &[u64] {
        &self.frequency
    }

    pub fn current_energy(&self) -> T
    where
        T: Copy,
    {
        self.current.energy
    }

    pub fn current_partition(&self) -> usize {
        self.current.index
    }

    /// Completed iterations since the chain was created.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Iterations performed by one call to [`run`](Samc::run).
    pub fn niter(&self) -> usize {
        self.niter
    }

    pub fn partition(&self) -> &EnergyPartition<T> {
        &self.partition
    }

    pub fn domain(&self) -> &DomainGuard<T> {
        &self.domain
    }

    pub fn tracker(&self) -> &ChainTracker {
        &self.tracker
    }
}

impl<T, E, G, R> Samc<T, E, G, R>
where
    T: Float,
    E: Energy<T>,
    G: GainSchedule<T>,
    R: Rng,
    StandardNormal: Distribution<T>,
    Standard: Distribution<T>,
{
    /// Runs `niter` iterations from the current state.
    pub fn run(&mut self) -> Result<SamcOutput<T>> {
        self.run_while(|_| true)
    }

    /**
    Runs up to `niter` iterations, calling `keep_going(completed)` before each
    one. Returning `false` stops between iterations; the output then holds
    exactly the completed rows and `frequency` sums to their number.
    */
    pub fn run_while<F>(&mut self, keep_going: F) -> Result<SamcOutput<T>>
    where
        F: FnMut(usize) -> bool,
    {
        let start = self.begin_run();
        let n_steps = self.niter;
        let samples = run_chain_while(self, n_steps, keep_going).map_err(|e| {
            self.labels = None;
            e
        })?;
        Ok(self.finish_run(start, samples))
    }

    /// Like [`run`](Samc::run), displaying a progress bar with the recent
    /// acceptance rate and the number of visited partitions.
    pub fn run_progress(&mut self) -> Result<SamcOutput<T>> {
        let start = self.begin_run();
        let n_steps = self.niter;

        let pb = ProgressBar::new(n_steps as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_prefix("SAMC");

        let samples = run_chain_with_progress(self, n_steps, &pb).map_err(|e| {
            self.labels = None;
            e
        })?;
        pb.finish_with_message("Done!");
        Ok(self.finish_run(start, samples))
    }

    fn begin_run(&mut self) -> RunStart {
        info!(
            nv = self.domain.nv(),
            bins = self.partition.n_bins(),
            niter = self.niter,
            start_iteration = self.iteration,
            "starting SAMC run"
        );
        self.labels = Some(Vec::with_capacity(self.niter));
        RunStart {
            n_accepted: self.n_accepted,
            n_out_of_domain: self.n_out_of_domain,
        }
    }

    fn finish_run(&mut self, start: RunStart, samples: Array2<T>) -> SamcOutput<T> {
        let labels = Array1::from(self.labels.take().unwrap_or_default());
        let mut frequency = Array1::<u64>::zeros(self.frequency.len());
        for &j in labels.iter() {
            frequency[j] += 1;
        }
        let output = SamcOutput {
            samples,
            frequency,
            theta: Array1::from(self.theta.theta().to_vec()),
            labels,
            vecpi: Array1::from(self.theta.vecpi().to_vec()),
            n_accepted: self.n_accepted - start.n_accepted,
            n_out_of_domain: self.n_out_of_domain - start.n_out_of_domain,
        };

        info!(
            iterations = output.niter(),
            acceptance_rate = output.acceptance_rate(),
            out_of_domain = output.n_out_of_domain,
            "finished SAMC run"
        );
        for (j, _) in self.frequency.iter().enumerate().filter(|(_, c)| **c == 0) {
            let (low, high) = self.partition.bounds(j);
            warn!(
                partition = j,
                low = as_f64(low),
                high = as_f64(high),
                theta = as_f64(self.theta.theta()[j]),
                "partition never visited"
            );
        }
        output
    }
}

impl<T, E, G, R> MarkovChain<T> for Samc<T, E, G, R>
where
    T: Float,
    E: Energy<T>,
    G: GainSchedule<T>,
    R: Rng,
    StandardNormal: Distribution<T>,
    Standard: Distribution<T>,
{
    /**
    Performs one SAMC iteration.

    A candidate outside the domain is rejected without evaluating its
    energy. `theta` is updated and the visit counted for the partition of
    the resulting current point, whether or not the move was accepted.

    # Errors

    [`SamcError::InvalidEnergyResult`] if the energy of an in-domain
    candidate is NaN. The chain is left as it was before the iteration,
    apart from the random draws already taken.
    */
    fn step(&mut self) -> Result<&Vec<T>> {
        let t = self.iteration + 1;
        let candidate = self.proposal.sample(&self.current_state, &mut self.rng);

        let mut accepted = false;
        if self.domain.admits(&candidate) {
            let energy = self.energy.energy(&candidate);
            if energy.is_nan() {
                return Err(SamcError::InvalidEnergyResult {
                    iteration: t,
                    candidate: candidate.iter().copied().map(as_f64).collect(),
                });
            }
            let level = EnergyLevel::new(energy, self.partition.index_of(energy));
            if self
                .acceptance
                .decide(self.current, level, self.theta.theta(), &mut self.rng)
            {
                self.current_state = candidate;
                self.current = level;
                accepted = true;
            }
        } else {
            self.n_out_of_domain += 1;
        }

        let visited = self.current.index;
        self.theta.update(self.gain.gain(t), visited);
        self.frequency[visited] += 1;
        if let Some(labels) = self.labels.as_mut() {
            labels.push(visited);
        }
        self.tracker.step(&self.current_state, accepted, visited);
        self.n_accepted += usize::from(accepted);
        self.iteration = t;

        if t % self.log_every == 0 {
            debug!(
                iteration = t,
                theta = ?self.theta.theta().iter().copied().map(as_f64).collect::<Vec<_>>(),
                frequency = ?self.frequency,
                p_accept = self.tracker.p_accept(),
                "SAMC progress"
            );
        }

        Ok(&self.current_state)
    }

    fn current_state(&self) -> &Vec<T> {
        &self.current_state
    }

    fn progress_message(&self) -> String {
        format!(
            "AcceptRate={:.3} Visited={}/{}",
            self.tracker.p_accept(),
            self.tracker.n_visited(),
            self.partition.n_bins()
        )
    }
}

/**
Runs a fresh chain for `config.niter` iterations and returns its output.

```rust
use samc::config::SamcConfig;
use samc::samc::samc;
use ndarray::arr1;

let config = SamcConfig::builder(2, arr1(&[f64::NEG_INFINITY, 1.0, f64::INFINITY]))
    .niter(500)
    .build()
    .unwrap();
let output = samc(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(), &config).unwrap();
assert_eq!(output.samples.nrows(), 500);
assert_eq!(output.theta.len(), 2);
```
*/
pub fn samc<T, E>(energy: E, config: &SamcConfig<T>) -> Result<SamcOutput<T>>
where
    T: Float,
    E: Energy<T>,
    StandardNormal: Distribution<T>,
    Standard: Distribution<T>,
{
    Samc::new(config, energy)?.run()
}
