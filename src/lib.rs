//! Stochastic Approximation Monte Carlo (SAMC) for continuous densities.
//!
//! SAMC is a Metropolis sampler that learns, while it runs, how much weight
//! each energy partition carries, and uses that estimate to push the chain
//! towards partitions it has under-visited. The result is a chain that moves
//! freely between modes, plus an estimate of the relative mass of every
//! partition.
//!
//! The entry points are [`samc::Samc`] and the one-call [`samc::samc`]. Both
//! take a [`config::SamcConfig`], usually built with
//! [`config::SamcConfig::builder`], and an energy function implementing
//! [`distributions::Energy`] (closures over `&[T]` qualify).
//!
//! ```rust
//! use samc::config::SamcConfig;
//! use samc::samc::samc;
//! use ndarray::{arr1, arr2};
//!
//! let inf = f64::INFINITY;
//! let config = SamcConfig::builder(1, arr1(&[-inf, 0.5, 2.0, inf]))
//!     .domain(arr2(&[[-5.0, 5.0]]))
//!     .niter(1_000)
//!     .stepsize(arr1(&[0.8]))
//!     .build()
//!     .unwrap();
//!
//! let output = samc(|x: &[f64]| x[0] * x[0], &config).unwrap();
//! assert_eq!(output.frequency.sum(), 1_000);
//! ```
//!
//! The library emits [`tracing`] events and never installs a subscriber.

pub mod acceptance;
pub mod config;
pub mod core;
pub mod distributions;
pub mod domain;
pub mod error;
pub mod gain;
pub mod partition;
pub mod samc;
pub mod stats;
pub mod theta;

pub use error::{ConfigError, Result, SamcError};
