//! Tournament selection.
//!
//! Picks `k` distinct individuals uniformly at random and keeps the one with
//! the lowest tour length. Larger `k` means stronger selection pressure:
//!
//! - k=2: light pressure (good for diversity)
//! - k=3-5: moderate pressure (typical default)
//! - k>5: strong pressure (risk of premature convergence)
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use rand::seq::index;
use rand::Rng;

/// Returns the population index of the tournament winner.
///
/// Samples `min(k, n)` distinct indices (at least one) without replacement.
/// Ties go to the earliest sampled contestant.
///
/// # Complexity
/// O(k) per selection
///
/// # Panics
/// Panics if `fitness` is empty.
pub fn tournament<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let n = fitness.len();
    assert!(n > 0, "cannot select from empty population");
    let k = k.clamp(1, n);

    let mut contestants = index::sample(rng, n, k).into_iter();
    let mut best = contestants.next().unwrap_or(0);
    for idx in contestants {
        if fitness[idx] < fitness[best] {
            best = idx;
        }
    }
    best
}

/// Tournament selection returning a copy of the winning tour.
pub fn tournament_tour<R: Rng + ?Sized>(
    population: &[Vec<usize>],
    fitness: &[f64],
    k: usize,
    rng: &mut R,
) -> Vec<usize> {
    assert_eq!(population.len(), fitness.len(), "population/fitness mismatch");
    population[tournament(fitness, k, rng)].clone()
}
