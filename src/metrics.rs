//! Tour metrics: length, percent error against an optimum, and a
//! rotation-invariant checksum for spotting duplicate cycles.

use crate::instance::CitySet;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Returns `true` if `perm` contains every index of `0..n` exactly once.
pub fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in perm {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Euclidean length of the closed tour, including the edge from the last
/// city back to the first.
///
/// # Panics
/// Panics if `tour` is not a permutation of `0..cities.len()`.
pub fn tour_length(tour: &[usize], cities: &CitySet) -> f64 {
    assert!(
        is_valid_permutation(tour, cities.len()),
        "tour is not a permutation of 0..{}: {tour:?}",
        cities.len()
    );
    closed_length(tour, cities)
}

/// Length of a tour already known to be a permutation.
#[inline]
pub(crate) fn closed_length(tour: &[usize], cities: &CitySet) -> f64 {
    let n = tour.len();
    (0..n)
        .map(|i| cities.distance(tour[i], tour[(i + 1) % n]))
        .sum()
}

/// `(value - optimum) * 100 / optimum`, or `NaN` when `optimum <= 0`.
pub fn percent_error(value: f64, optimum: f64) -> f64 {
    if optimum <= 0.0 {
        return f64::NAN;
    }
    (value - optimum) * 100.0 / optimum
}

/// Hash of the tour rotated to start at its smallest element.
///
/// Rotations of the same cycle collide; the reversed cycle generally does not.
pub fn checksum(tour: &[usize]) -> String {
    let Some(start) = tour
        .iter()
        .enumerate()
        .min_by_key(|&(_, v)| v)
        .map(|(i, _)| i)
    else {
        return "0".to_string();
    };

    let mut hasher = FxHasher::default();
    tour.len().hash(&mut hasher);
    for v in tour[start..].iter().chain(&tour[..start]) {
        v.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}
