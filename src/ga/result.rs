//! Result packaging.
//!
//! A [`GaResult`] is assembled once from the final population and never
//! changed afterwards. Its serde shape is the JSON record written per run.

use super::config::{CrossoverKind, GaConfig, MutationKind};
use crate::metrics::checksum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// A tour with its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTour {
    pub cost: f64,
    pub tour: Vec<usize>,
}

/// Snapshot of the parameters a run used.
///
/// `pmut` is the mutation probability at the end of the run, which the
/// adaptive policy may have raised above `pmut_initial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    #[serde(rename = "N")]
    pub population_size: usize,
    #[serde(rename = "maxIter")]
    pub max_iterations: usize,
    pub crossover: CrossoverKind,
    pub pmut: f64,
    pub pmut_initial: f64,
    pub elitism: f64,
    pub seed: u64,
    pub mut_kind: MutationKind,
    pub tournament_k: usize,
}

impl RunParams {
    pub(crate) fn snapshot(config: &GaConfig, final_mutation_rate: f64) -> Self {
        Self {
            population_size: config.population_size,
            max_iterations: config.max_iterations,
            crossover: config.crossover,
            pmut: final_mutation_rate,
            pmut_initial: config.mutation_rate,
            elitism: config.elite_ratio,
            seed: config.seed,
            mut_kind: config.mutation,
            tournament_k: config.tournament_size,
        }
    }
}

/// Outcome of one GA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaResult {
    /// Shortest tour of the final population.
    pub best: ScoredTour,

    /// Up to three population members in ascending length, ties in
    /// population order.
    pub top3: Vec<ScoredTour>,

    /// Best length at the end of each generation.
    pub best_history: Vec<f64>,

    /// Mutation probability in effect after each generation.
    pub pmut_history: Vec<f64>,

    /// Wall time of the whole run in seconds, initial population included.
    pub time_s: f64,

    pub params: RunParams,

    /// Generations actually executed.
    pub generations: usize,

    /// Whether the run stopped on a cancellation request.
    pub cancelled: bool,

    /// Number of distinct cycles (by checksum) in the final population.
    pub unique_tours: usize,
}

/// Indices of `fitness` sorted ascending; equal values keep their order.
pub(crate) fn rank(fitness: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
    order
}

/// Everything the runner hands over at termination.
pub(crate) struct FinalState<'a> {
    pub population: &'a [Vec<usize>],
    pub fitness: &'a [f64],
    pub best_history: Vec<f64>,
    pub pmut_history: Vec<f64>,
    pub elapsed: Duration,
    pub params: RunParams,
    pub cancelled: bool,
}

/// Builds the result record from the final population.
///
/// # Panics
/// Panics if the population is empty.
pub(crate) fn package(state: FinalState<'_>) -> GaResult {
    assert!(!state.population.is_empty(), "population must not be empty");

    let top3: Vec<ScoredTour> = rank(state.fitness)
        .into_iter()
        .take(3)
        .map(|i| ScoredTour {
            cost: state.fitness[i],
            tour: state.population[i].clone(),
        })
        .collect();

    let unique_tours = state
        .population
        .iter()
        .map(|t| checksum(t))
        .collect::<HashSet<_>>()
        .len();

    GaResult {
        best: top3[0].clone(),
        top3,
        generations: state.best_history.len(),
        best_history: state.best_history,
        pmut_history: state.pmut_history,
        time_s: state.elapsed.as_secs_f64(),
        params: state.params,
        cancelled: state.cancelled,
        unique_tours,
    }
}
