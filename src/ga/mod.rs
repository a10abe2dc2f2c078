//! Genetic Algorithm for the Euclidean TSP.
//!
//! Tours are permutations of city indices. The runner keeps a population of
//! tours with their lengths, carries the best ones over unchanged, and fills
//! the rest of each generation with tournament-selected, recombined and
//! mutated children. A stagnation policy raises the mutation rate when the
//! best length stops improving.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, operators, rates, seed)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final result with top tours and convergence history
//!
//! # Submodules
//!
//! - [`operators`]: Permutation crossover (OX, PMX) and mutation operators
//! - [`selection`]: Tournament selection
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod result;
mod runner;
pub mod selection;

pub use config::{CrossoverKind, GaConfig, MutationKind, MUTATION_RATE_CAP};
pub use result::{GaResult, RunParams, ScoredTour};
pub use runner::{run_ga, GaRunner, MUTATION_RATE_GROWTH, STAGNATION_WINDOW};
