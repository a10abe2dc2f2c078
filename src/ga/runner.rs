//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → elitism → selection → crossover → mutation → repeat.
//!
//! The loop runs for a fixed number of generations. The only state carried
//! between generations is the population with its tour lengths, the
//! convergence history and the current mutation rate.

use super::config::{CrossoverKind, GaConfig, MutationKind, MUTATION_RATE_CAP};
use super::operators::{invert_mutation, order_crossover, pmx_crossover, swap_mutation};
use super::result::{package, rank, FinalState, GaResult, RunParams};
use super::selection::tournament_tour;
use crate::error::{Result, TspError};
use crate::instance::CitySet;
use crate::metrics::{closed_length, is_valid_permutation};
use crate::random::{create_rng, random_permutation};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Generations without improvement before the mutation rate is raised.
pub const STAGNATION_WINDOW: usize = 50;

/// Multiplier applied to the mutation rate on stagnation.
pub const MUTATION_RATE_GROWTH: f64 = 1.1;

/// How often (in generations) progress is logged at debug level.
const LOG_INTERVAL: usize = 100;

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use tsp_ga::ga::{GaConfig, GaRunner};
/// use tsp_ga::instance::CitySet;
///
/// let cities = CitySet::from_coords([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_iterations(30)
///     .with_seed(42);
/// let result = GaRunner::run(&cities, &config).unwrap();
/// assert!((result.best.cost - 4.0).abs() < 1e-9);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA.
    ///
    /// # Errors
    /// [`TspError::InvalidConfiguration`] before any generation runs if the
    /// configuration is invalid, or [`TspError::PermutationInvariantViolation`]
    /// if an operator ever emits a non-permutation.
    pub fn run(cities: &CitySet, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_cancel(cities, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// The flag is checked at the start of each generation. When it is set,
    /// the run stops and the result is built from the current population.
    pub fn run_with_cancel(
        cities: &CitySet,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        config.validate()?;

        let started = Instant::now();
        let n = cities.len();
        let pop_size = config.population_size;
        let elite_count = config.elite_count();
        let mut rng = create_rng(config.seed);

        info!(
            cities = n,
            population = pop_size,
            generations = config.max_iterations,
            crossover = %config.crossover,
            mutation = %config.mutation,
            seed = config.seed,
            "starting GA run"
        );

        // 1. Initialize population
        let mut population: Vec<Vec<usize>> = (0..pop_size)
            .map(|_| random_permutation(n, &mut rng))
            .collect();

        // 2. Evaluate initial population
        let mut fitness = evaluate_population(cities, &population, config.parallel);

        let mut mutation_rate = config.mutation_rate;
        let mut best_history = Vec::with_capacity(config.max_iterations);
        let mut pmut_history = Vec::with_capacity(config.max_iterations);
        let mut cancelled = false;

        // 3. Evolutionary loop
        for gen in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // Elite preservation (stable: ties keep population order)
            let order = rank(&fitness);
            let mut next_gen: Vec<Vec<usize>> = order[..elite_count]
                .iter()
                .map(|&i| population[i].clone())
                .collect();

            // Generate offspring
            while next_gen.len() < pop_size {
                let k = config.tournament_size;
                let p1 = tournament_tour(&population, &fitness, k, &mut rng);
                let p2 = tournament_tour(&population, &fitness, k, &mut rng);
                let child = breed(&p1, &p2, config, mutation_rate, &mut rng)?;
                next_gen.push(child);
            }

            population = next_gen;
            fitness = evaluate_population(cities, &population, config.parallel);

            let gen_best = fitness.iter().copied().fold(f64::INFINITY, f64::min);
            best_history.push(gen_best);

            let adapted = adapt_mutation_rate(&best_history, mutation_rate);
            if adapted > mutation_rate {
                debug!(
                    generation = gen,
                    from = mutation_rate,
                    to = adapted,
                    "stagnation, raising mutation rate"
                );
            }
            mutation_rate = adapted;
            pmut_history.push(mutation_rate);

            if (gen + 1) % LOG_INTERVAL == 0 {
                debug!(generation = gen + 1, best = gen_best, mutation_rate, "progress");
            }
        }

        let result = package(FinalState {
            population: &population,
            fitness: &fitness,
            best_history,
            pmut_history,
            elapsed: started.elapsed(),
            params: RunParams::snapshot(config, mutation_rate),
            cancelled,
        });

        info!(
            best = result.best.cost,
            generations = result.generations,
            time_s = result.time_s,
            cancelled,
            "GA run finished"
        );

        Ok(result)
    }
}

/// Runs the GA from individual parameters.
///
/// Convenience wrapper over [`GaRunner::run`] mirroring the benchmark's
/// parameter list.
#[allow(clippy::too_many_arguments)]
pub fn run_ga(
    cities: &CitySet,
    population_size: usize,
    max_iterations: usize,
    crossover: CrossoverKind,
    mutation_rate: f64,
    elite_ratio: f64,
    seed: u64,
    mutation: MutationKind,
    tournament_size: usize,
) -> Result<GaResult> {
    let config = GaConfig::default()
        .with_population_size(population_size)
        .with_max_iterations(max_iterations)
        .with_crossover(crossover)
        .with_mutation_rate(mutation_rate)
        .with_elite_ratio(elite_ratio)
        .with_seed(seed)
        .with_mutation(mutation)
        .with_tournament_size(tournament_size);
    GaRunner::run(cities, &config)
}

/// Crossover then mutation, checking the permutation after each step.
fn breed<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    config: &GaConfig,
    mutation_rate: f64,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let child = match config.crossover {
        CrossoverKind::OX => order_crossover(parent1, parent2, rng),
        CrossoverKind::PMX => pmx_crossover(parent1, parent2, rng)?,
    };
    ensure_permutation(&child, parent1, parent2, crossover_name(config.crossover))?;

    let mutated = match config.mutation {
        MutationKind::Inversion => invert_mutation(&child, mutation_rate, rng),
        MutationKind::Swap => swap_mutation(&child, mutation_rate, rng),
    };
    ensure_permutation(&mutated, &child, &child, mutation_name(config.mutation))?;

    Ok(mutated)
}

fn crossover_name(kind: CrossoverKind) -> &'static str {
    match kind {
        CrossoverKind::OX => "OX",
        CrossoverKind::PMX => "PMX",
    }
}

fn mutation_name(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Inversion => "inversion mutation",
        MutationKind::Swap => "swap mutation",
    }
}

fn ensure_permutation(
    child: &[usize],
    parent1: &[usize],
    parent2: &[usize],
    operator: &'static str,
) -> Result<()> {
    if is_valid_permutation(child, parent1.len()) {
        return Ok(());
    }
    Err(TspError::PermutationInvariantViolation {
        operator,
        parent1: parent1.to_vec(),
        parent2: parent2.to_vec(),
        child: child.to_vec(),
    })
}

/// Stagnation-escape policy.
///
/// Once more than [`STAGNATION_WINDOW`] generations have been recorded, if
/// the best of the last 50 is no better than the value 51 generations back,
/// the rate grows by 10% up to [`MUTATION_RATE_CAP`]. A rate already at or
/// above the cap is left alone, so the rate never decreases.
pub(crate) fn adapt_mutation_rate(history: &[f64], rate: f64) -> f64 {
    let len = history.len();
    if len <= STAGNATION_WINDOW + 1 || rate >= MUTATION_RATE_CAP {
        return rate;
    }
    let baseline = history[len - STAGNATION_WINDOW - 1];
    let recent = history[len - STAGNATION_WINDOW..]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if recent >= baseline {
        (rate * MUTATION_RATE_GROWTH).min(MUTATION_RATE_CAP)
    } else {
        rate
    }
}

/// Evaluate tour lengths of the whole population.
#[cfg(feature = "parallel")]
fn evaluate_population(cities: &CitySet, population: &[Vec<usize>], parallel: bool) -> Vec<f64> {
    if parallel {
        population
            .par_iter()
            .map(|tour| closed_length(tour, cities))
            .collect()
    } else {
        population
            .iter()
            .map(|tour| closed_length(tour, cities))
            .collect()
    }
}

/// Evaluate tour lengths of the whole population.
#[cfg(not(feature = "parallel"))]
fn evaluate_population(cities: &CitySet, population: &[Vec<usize>], _parallel: bool) -> Vec<f64> {
    population
        .iter()
        .map(|tour| closed_length(tour, cities))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{generate, Shape};
    use crate::metrics::tour_length;

    fn unit_square() -> CitySet {
        CitySet::from_coords([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap()
    }

    fn random_instance(n: usize, seed: u64) -> CitySet {
        CitySet::new(generate(n, seed, Shape::Uniform).unwrap()).unwrap()
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_iterations(120)
            .with_elite_ratio(0.05)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_history_length_matches_iterations() {
        let cities = random_instance(12, 1);
        let result = GaRunner::run(&cities, &small_config()).unwrap();
        assert_eq!(result.best_history.len(), 120);
        assert_eq!(result.pmut_history.len(), 120);
        assert_eq!(result.generations, 120);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_elitism_makes_history_monotone() {
        for crossover in [CrossoverKind::OX, CrossoverKind::PMX] {
            for mutation in [MutationKind::Inversion, MutationKind::Swap] {
                let cities = random_instance(15, 3);
                let config = small_config().with_crossover(crossover).with_mutation(mutation);
                let result = GaRunner::run(&cities, &config).unwrap();
                for w in result.best_history.windows(2) {
                    assert!(
                        w[1] <= w[0],
                        "{crossover}/{mutation}: history went up {} -> {}",
                        w[0],
                        w[1]
                    );
                }
            }
        }
    }

    #[test]
    fn test_best_is_valid_and_consistent() {
        let cities = random_instance(10, 5);
        let result = GaRunner::run(&cities, &small_config()).unwrap();
        assert!(is_valid_permutation(&result.best.tour, 10));
        assert!((tour_length(&result.best.tour, &cities) - result.best.cost).abs() < 1e-9);
        assert_eq!(result.top3.len(), 3);
        assert!(result.top3.windows(2).all(|w| w[0].cost <= w[1].cost));
        assert_eq!(result.best, result.top3[0]);
        assert_eq!(*result.best_history.last().unwrap(), result.best.cost);
        assert!(result.unique_tours >= 1 && result.unique_tours <= 40);
    }

    #[test]
    fn test_improves_on_random_tours() {
        let cities = random_instance(20, 9);
        let config = small_config().with_max_iterations(300);
        let result = GaRunner::run(&cities, &config).unwrap();

        let mut rng = create_rng(1234);
        let random_mean: f64 = (0..50)
            .map(|_| tour_length(&random_permutation(20, &mut rng), &cities))
            .sum::<f64>()
            / 50.0;
        assert!(
            result.best.cost < 0.7 * random_mean,
            "GA {} vs random mean {random_mean}",
            result.best.cost
        );
    }

    #[test]
    fn test_same_seed_same_result() {
        let cities = random_instance(14, 2);
        let config = small_config().with_crossover(CrossoverKind::PMX);
        let a = GaRunner::run(&cities, &config).unwrap();
        let b = GaRunner::run(&cities, &config).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.top3, b.top3);
        assert_eq!(a.best_history, b.best_history);
        assert_eq!(a.pmut_history, b.pmut_history);
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn test_different_seed_explores_differently() {
        let cities = random_instance(25, 2);
        let config = small_config().with_max_iterations(5);
        let a = GaRunner::run(&cities, &config).unwrap();
        let b = GaRunner::run(&cities, &config.clone().with_seed(43)).unwrap();
        assert_ne!(a.best_history, b.best_history);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let cities = random_instance(16, 4);
        let seq = GaRunner::run(&cities, &small_config()).unwrap();
        let par = GaRunner::run(&cities, &small_config().with_parallel(true)).unwrap();
        assert_eq!(seq.best, par.best);
        assert_eq!(seq.best_history, par.best_history);
    }

    #[test]
    fn test_zero_iterations_uses_initial_population() {
        let cities = random_instance(8, 6);
        let config = small_config().with_max_iterations(0);
        let result = GaRunner::run(&cities, &config).unwrap();
        assert!(result.best_history.is_empty());
        assert_eq!(result.generations, 0);
        assert!(is_valid_permutation(&result.best.tour, 8));
        assert!((result.params.pmut - config.mutation_rate).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let cities = unit_square();
        let err = GaRunner::run(&cities, &small_config().with_population_size(1)).unwrap_err();
        assert!(matches!(err, TspError::InvalidConfiguration(_)));

        let err = run_ga(&cities, 10, 5, CrossoverKind::OX, 0.2, 1.0, 42, MutationKind::Swap, 3)
            .unwrap_err();
        assert!(matches!(err, TspError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_adaptive_rate_rises_on_stagnation() {
        // four cities: the optimum is found immediately, then nothing improves
        let cities = unit_square();
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_iterations(200)
            .with_mutation_rate(0.1)
            .with_seed(42)
            .with_parallel(false);
        let result = GaRunner::run(&cities, &config).unwrap();

        assert!(result.pmut_history[..=STAGNATION_WINDOW]
            .iter()
            .all(|&r| (r - 0.1).abs() < 1e-15));
        assert!(result.pmut_history[100] > 0.1);
        for w in result.pmut_history.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(result.pmut_history.iter().all(|&r| r <= MUTATION_RATE_CAP));
        assert_eq!(result.params.pmut, MUTATION_RATE_CAP);
        assert!((result.params.pmut_initial - 0.1).abs() < 1e-15);
        // caller's config is untouched
        assert!((config.mutation_rate - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_rate_above_cap_is_not_lowered() {
        let cities = unit_square();
        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_iterations(80)
            .with_mutation_rate(0.8)
            .with_parallel(false);
        let result = GaRunner::run(&cities, &config).unwrap();
        assert!(result.pmut_history.iter().all(|&r| r == 0.8));
    }

    #[test]
    fn test_adapt_rate_window() {
        let flat = vec![10.0; 51];
        assert_eq!(adapt_mutation_rate(&flat, 0.2), 0.2, "needs more than 51 generations");

        let flat = vec![10.0; 52];
        assert!((adapt_mutation_rate(&flat, 0.2) - 0.22).abs() < 1e-12);

        let mut improving = vec![10.0; 52];
        improving[51] = 9.0;
        assert_eq!(adapt_mutation_rate(&improving, 0.2), 0.2);

        assert_eq!(adapt_mutation_rate(&flat, 0.59), MUTATION_RATE_CAP);
        assert_eq!(adapt_mutation_rate(&flat, 0.0), 0.0);
    }

    #[test]
    fn test_cancellation_before_first_generation() {
        let cities = random_instance(10, 7);
        let cancel = Arc::new(AtomicBool::new(true));
        let result = GaRunner::run_with_cancel(&cities, &small_config(), Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert!(is_valid_permutation(&result.best.tour, 10));
    }

    #[test]
    fn test_cancellation_from_other_thread() {
        let cities = random_instance(60, 7);
        let config = small_config().with_max_iterations(1_000_000);
        let cancel = Arc::new(AtomicBool::new(false));

        let flag = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            flag.store(true, Ordering::Relaxed);
        });

        let result = GaRunner::run_with_cancel(&cities, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert!(result.generations < 1_000_000);
        assert_eq!(result.generations, result.best_history.len());
    }

    #[test]
    fn test_breed_flags_bad_parents() {
        let mut rng = create_rng(1);
        let config = small_config().with_crossover(CrossoverKind::OX);
        // every segment of parent1 repeats gene 0
        let err = breed(&[0, 0, 0, 0], &[0, 1, 2, 3], &config, 0.0, &mut rng).unwrap_err();
        assert!(matches!(err, TspError::PermutationInvariantViolation { operator: "OX", .. }));
    }
}
