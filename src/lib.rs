//! Genetic algorithm benchmark for the Euclidean Traveling Salesman Problem.
//!
//! Solves closed TSP instances with a permutation GA and compares the tours
//! against a reference optimum:
//!
//! - **Instances** ([`instance`]): city sets from TSPLIB `EUC_2D` files, CSV
//!   files or a seeded generator.
//! - **Metrics** ([`metrics`]): tour length, percent error and a
//!   rotation-invariant tour checksum.
//! - **Genetic Algorithm** ([`ga`]): OX/PMX crossover, inversion/swap
//!   mutation, tournament selection, elitism and a stagnation-driven
//!   mutation rate.
//! - **Exact baseline** ([`exact`]): enumeration for instances of up to ten
//!   cities.
//! - **Reporting** ([`report`]): JSON result records and summary CSV.
//!
//! # Example
//!
//! ```
//! use tsp_ga::ga::{run_ga, CrossoverKind, MutationKind};
//! use tsp_ga::instance::CitySet;
//!
//! let cities = CitySet::from_coords([
//!     (0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 1.8),
//! ]).unwrap();
//! let result = run_ga(&cities, 50, 100, CrossoverKind::OX, 0.2, 0.05, 42,
//!                     MutationKind::Inversion, 3).unwrap();
//! assert_eq!(result.best_history.len(), 100);
//! ```

pub mod cli;
pub mod error;
pub mod exact;
pub mod ga;
pub mod instance;
pub mod metrics;
pub mod random;
pub mod report;

pub use error::{Result, TspError};
