//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.
//! It is read-only during a run: the adaptive mutation rate lives in the
//! runner and only its final value is recorded in the result.

use crate::error::{Result, TspError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound the adaptive policy never raises the mutation rate past.
pub const MUTATION_RATE_CAP: f64 = 0.6;

/// Crossover operator used to build children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverKind {
    /// Order Crossover.
    #[default]
    OX,
    /// Partially Mapped Crossover.
    PMX,
}

impl FromStr for CrossoverKind {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OX" => Ok(CrossoverKind::OX),
            "PMX" => Ok(CrossoverKind::PMX),
            other => Err(TspError::config(format!(
                "unknown crossover {other:?} (expected OX or PMX)"
            ))),
        }
    }
}

impl fmt::Display for CrossoverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CrossoverKind::OX => "OX",
            CrossoverKind::PMX => "PMX",
        })
    }
}

/// Mutation operator applied to every child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Reverse a random segment.
    #[default]
    #[serde(alias = "invert")]
    Inversion,
    /// Exchange two random positions.
    Swap,
}

impl FromStr for MutationKind {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inversion" | "invert" => Ok(MutationKind::Inversion),
            "swap" => Ok(MutationKind::Swap),
            other => Err(TspError::config(format!(
                "unknown mutation {other:?} (expected inversion or swap)"
            ))),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Inversion => "inversion",
            MutationKind::Swap => "swap",
        })
    }
}

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use tsp_ga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 300);
/// assert_eq!(config.max_iterations, 2000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tsp_ga::ga::{CrossoverKind, GaConfig, MutationKind};
///
/// let config = GaConfig::default()
///     .with_population_size(100)
///     .with_crossover(CrossoverKind::PMX)
///     .with_mutation(MutationKind::Swap)
///     .with_mutation_rate(0.1)
///     .with_seed(1337);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Number of tours in the population (N).
    pub population_size: usize,

    /// Number of generations to run. Zero returns the initial population.
    pub max_iterations: usize,

    /// Crossover operator.
    pub crossover: CrossoverKind,

    /// Initial mutation probability per child (0.0–1.0).
    pub mutation_rate: f64,

    /// Mutation operator.
    pub mutation: MutationKind,

    /// Fraction of the population carried over unchanged, in `[0, 1)`.
    ///
    /// At least one elite is always kept.
    pub elite_ratio: f64,

    /// Number of distinct contestants per tournament.
    pub tournament_size: usize,

    /// Random seed. Equal seeds and parameters replay the same run.
    pub seed: u64,

    /// Evaluate tour lengths on the rayon pool (needs the `parallel` feature).
    ///
    /// Has no effect on results, only on wall time.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            max_iterations: 2000,
            crossover: CrossoverKind::OX,
            mutation_rate: 0.2,
            mutation: MutationKind::Inversion,
            elite_ratio: 0.03,
            tournament_size: 3,
            seed: 42,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_crossover(mut self, kind: CrossoverKind) -> Self {
        self.crossover = kind;
        self
    }

    pub fn with_mutation(mut self, kind: MutationKind) -> Self {
        self.mutation = kind;
        self
    }

    /// Sets the initial mutation probability. Not clamped; see [`validate`](Self::validate).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elite fraction. Not clamped; see [`validate`](Self::validate).
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preset used for multi-seed scenario runs: N=100, 300 generations.
    pub fn scenario() -> Self {
        Self {
            population_size: 100,
            max_iterations: 300,
            ..Self::default()
        }
    }

    /// Number of elites: `max(1, floor(elite_ratio * N))`.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_ratio) as usize).max(1)
    }

    /// Validates the configuration.
    ///
    /// Returns [`TspError::InvalidConfiguration`] describing the first bad
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(TspError::config(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if !(0.0..1.0).contains(&self.elite_ratio) {
            return Err(TspError::config(format!(
                "elite_ratio must be in [0, 1), got {}",
                self.elite_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(TspError::config(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(TspError::config(format!(
                "tournament_size must be in 1..={}, got {}",
                self.population_size, self.tournament_size
            )));
        }
        Ok(())
    }
}
