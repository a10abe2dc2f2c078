//! Permutation operators for TSP tours.
//!
//! Crossover and mutation on `&[usize]` tours. Every operator reads its
//! inputs and returns a fresh tour; parents may be elites that are still in
//! the population, so they are never modified.
//!
//! # Crossover Operators
//!
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//!
//! # Mutation Operators
//!
//! - [`invert_mutation`]: reverse a random segment (2-opt move)
//! - [`swap_mutation`]: exchange two random positions
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use crate::error::{Result, TspError};
use crate::random::distinct_pair;
use rand::Rng;

// ============================================================================
// Crossover operators
// ============================================================================

/// Order Crossover (OX).
///
/// Picks two distinct cut points `a < b`, copies `parent1[a..=b]` into the
/// child at the same positions, then fills the remaining positions from
/// index 0 upward with the genes of `parent2` not already in the child, in
/// `parent2`'s order.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return parent1.to_vec();
    }
    let (start, end) = distinct_pair(n, rng);
    order_crossover_at(parent1, parent2, start, end)
}

/// OX with explicit cut points `start <= end`.
///
/// # Complexity
/// O(n) time, O(n) space
pub fn order_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < n, "bad segment [{start}, {end}] for length {n}");

    let mut taken = vec![false; n];
    for &gene in &parent1[start..=end] {
        taken[gene] = true;
    }

    let mut fill = parent2.iter().copied().filter(|&g| !taken[g]);
    let mut child = Vec::with_capacity(n);
    for i in 0..n {
        if (start..=end).contains(&i) {
            child.push(parent1[i]);
        } else if let Some(gene) = fill.next() {
            child.push(gene);
        }
    }
    child
}

/// Partially Mapped Crossover (PMX).
///
/// Picks two distinct cut points `a < b` and copies `parent1[a..=b]` into the
/// child. Each position outside the segment takes `parent2`'s value there;
/// while that value already sits in the segment at position `k`, it is
/// replaced by `parent2[k]` (the mapping `parent1[k] -> parent2[k]`).
///
/// # Errors
/// [`TspError::PermutationInvariantViolation`] if a mapping chain runs
/// longer than `n` steps, which only happens when a parent is not a
/// permutation.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn pmx_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<Vec<usize>> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return Ok(parent1.to_vec());
    }
    let (start, end) = distinct_pair(n, rng);
    pmx_crossover_at(parent1, parent2, start, end)
}

/// PMX with explicit cut points `start <= end`.
///
/// # Complexity
/// O(n) amortized: every chain step moves to a distinct segment position.
pub fn pmx_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Result<Vec<usize>> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < n, "bad segment [{start}, {end}] for length {n}");

    // segment_pos[v] = position of gene v inside the copied segment
    let mut segment_pos: Vec<Option<usize>> = vec![None; n];
    for i in start..=end {
        segment_pos[parent1[i]] = Some(i);
    }

    let mut child = Vec::with_capacity(n);
    for pos in 0..n {
        if (start..=end).contains(&pos) {
            child.push(parent1[pos]);
            continue;
        }
        let mut gene = parent2[pos];
        let mut steps = 0;
        while let Some(k) = segment_pos[gene] {
            gene = parent2[k];
            steps += 1;
            if steps > n {
                return Err(TspError::PermutationInvariantViolation {
                    operator: "PMX",
                    parent1: parent1.to_vec(),
                    parent2: parent2.to_vec(),
                    child,
                });
            }
        }
        child.push(gene);
    }
    Ok(child)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Segment inversion: with probability `p`, reverse `tour[i..=j]` for two
/// random positions `i < j`. Returns a new tour either way.
pub fn invert_mutation<R: Rng + ?Sized>(tour: &[usize], p: f64, rng: &mut R) -> Vec<usize> {
    let mut out = tour.to_vec();
    if out.len() < 2 || rng.random_range(0.0..1.0) >= p {
        return out;
    }
    let (i, j) = distinct_pair(out.len(), rng);
    out[i..=j].reverse();
    out
}

/// Swap mutation: with probability `p`, exchange two distinct random
/// positions. Returns a new tour either way.
pub fn swap_mutation<R: Rng + ?Sized>(tour: &[usize], p: f64, rng: &mut R) -> Vec<usize> {
    let mut out = tour.to_vec();
    if out.len() < 2 || rng.random_range(0.0..1.0) >= p {
        return out;
    }
    let (i, j) = distinct_pair(out.len(), rng);
    out.swap(i, j);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::is_valid_permutation;
    use crate::random::create_rng;

    fn identity(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    fn reversed(n: usize) -> Vec<usize> {
        (0..n).rev().collect()
    }

    // ---- OX Crossover ----

    #[test]
    fn test_ox_produces_valid_permutations() {
        let mut rng = create_rng(42);
        let p1 = identity(8);
        let p2 = reversed(8);
        for _ in 0..100 {
            let c = order_crossover(&p1, &p2, &mut rng);
            assert!(is_valid_permutation(&c, 8), "OX child not valid: {c:?}");
        }
    }

    #[test]
    fn test_ox_known_child() {
        let p1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = vec![3, 7, 5, 1, 6, 0, 2, 4];
        // segment [2, 4] = 2,3,4; fill from p2 skipping those: 7,5,1,6,0
        let c = order_crossover_at(&p1, &p2, 2, 4);
        assert_eq!(c, vec![7, 5, 2, 3, 4, 1, 6, 0]);
    }

    #[test]
    fn test_ox_fill_keeps_donor_order() {
        let mut rng = create_rng(123);
        let p1 = identity(10);
        let p2 = reversed(10);
        for _ in 0..50 {
            let c = order_crossover(&p1, &p2, &mut rng);
            // genes taken from p2 keep p2's relative order (descending here)
            let foreign: Vec<usize> = c
                .iter()
                .enumerate()
                .filter(|&(i, &g)| g != p1[i])
                .map(|(_, &g)| g)
                .collect();
            assert!(foreign.windows(2).all(|w| w[0] > w[1]), "{c:?}");
        }
    }

    #[test]
    fn test_ox_differs_from_both_parents() {
        let p1 = identity(20);
        let p2 = reversed(20);
        let c = order_crossover_at(&p1, &p2, 5, 12);
        assert_ne!(c, p1);
        assert_ne!(c, p2);
        assert!(is_valid_permutation(&c, 20));
    }

    #[test]
    fn test_ox_does_not_touch_parents() {
        let mut rng = create_rng(5);
        let p1 = identity(12);
        let p2 = reversed(12);
        let _ = order_crossover(&p1, &p2, &mut rng);
        assert_eq!(p1, identity(12));
        assert_eq!(p2, reversed(12));
    }

    #[test]
    fn test_ox_single_element() {
        let mut rng = create_rng(42);
        assert_eq!(order_crossover(&[0], &[0], &mut rng), vec![0]);
    }

    #[test]
    fn test_ox_two_elements() {
        let mut rng = create_rng(42);
        for _ in 0..20 {
            let c = order_crossover(&[0, 1], &[1, 0], &mut rng);
            // both cut points distinct: the whole of parent1 is copied
            assert_eq!(c, vec![0, 1]);
        }
    }

    // ---- PMX Crossover ----

    #[test]
    fn test_pmx_produces_valid_permutations() {
        let mut rng = create_rng(42);
        let p1 = identity(8);
        let p2 = vec![3, 7, 5, 1, 6, 0, 2, 4];
        for _ in 0..100 {
            let c = pmx_crossover(&p1, &p2, &mut rng).unwrap();
            assert!(is_valid_permutation(&c, 8), "PMX child not valid: {c:?}");
        }
    }

    #[test]
    fn test_pmx_known_child() {
        // Classic example: p1 = 1 2 3 | 4 5 6 7 | 8 9, p2 = 9 3 7 | 8 2 6 5 | 1 4
        // (shifted to 0-based genes)
        let p1: Vec<usize> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9].into_iter().map(|g| g - 1).collect();
        let p2: Vec<usize> = vec![9, 3, 7, 8, 2, 6, 5, 1, 4].into_iter().map(|g| g - 1).collect();
        let c = pmx_crossover_at(&p1, &p2, 3, 6).unwrap();
        let expected: Vec<usize> =
            vec![9, 3, 2, 4, 5, 6, 7, 1, 8].into_iter().map(|g| g - 1).collect();
        assert_eq!(c, expected);
    }

    #[test]
    fn test_pmx_keeps_parent2_positions_outside_conflicts() {
        let p1 = identity(6);
        let p2 = vec![5, 4, 3, 2, 1, 0];
        // segment [2, 3] = 2,3; positions 0,1,4,5 of p2 hold 5,4,1,0 which
        // do not clash, so they stay put
        let c = pmx_crossover_at(&p1, &p2, 2, 3).unwrap();
        assert_eq!(c, vec![5, 4, 2, 3, 1, 0]);
    }

    #[test]
    fn test_pmx_differs_from_both_parents() {
        let p1 = identity(20);
        let p2 = reversed(20);
        let c = pmx_crossover_at(&p1, &p2, 3, 9).unwrap();
        assert_ne!(c, p1);
        assert_ne!(c, p2);
        assert!(is_valid_permutation(&c, 20));
    }

    #[test]
    fn test_pmx_identical_parents() {
        let mut rng = create_rng(42);
        let p = vec![0, 1, 2, 3, 4];
        assert_eq!(pmx_crossover(&p, &p, &mut rng).unwrap(), p);
    }

    #[test]
    fn test_pmx_single_element() {
        let mut rng = create_rng(42);
        assert_eq!(pmx_crossover(&[0], &[0], &mut rng).unwrap(), vec![0]);
    }

    #[test]
    fn test_pmx_chain_guard_on_broken_parent() {
        // parent2 is not a permutation: 0 maps to 1, 1 maps to 0 forever
        let p1 = vec![0, 1, 2];
        let p2 = vec![1, 0, 0];
        let err = pmx_crossover_at(&p1, &p2, 0, 1).unwrap_err();
        assert!(matches!(
            err,
            TspError::PermutationInvariantViolation { operator: "PMX", .. }
        ));
    }

    #[test]
    fn test_ox_mostly_differs_from_parents() {
        let mut rng = create_rng(42);
        let p1 = identity(20);
        let p2 = reversed(20);
        let fresh = (0..200)
            .map(|_| order_crossover(&p1, &p2, &mut rng))
            .filter(|c| *c != p1 && *c != p2)
            .count();
        // only segments leaving a single free position reproduce parent1
        assert!(fresh >= 190, "only {fresh}/200 OX children were new");
    }

    #[test]
    fn test_pmx_mostly_differs_from_parents() {
        let mut rng = create_rng(42);
        let p1 = identity(20);
        let p2 = reversed(20);
        let fresh = (0..200)
            .map(|_| pmx_crossover(&p1, &p2, &mut rng).unwrap())
            .filter(|c| *c != p1 && *c != p2)
            .count();
        // mirrored parents: segments [a, 19] with a <= 10 and [0, b] with
        // b >= 9 map every free position back onto parent1
        assert!(fresh >= 150, "only {fresh}/200 PMX children were new");
    }

    // ---- Mutation ----

    #[test]
    fn test_invert_preserves_permutation() {
        let mut rng = create_rng(42);
        let perm = identity(10);
        for _ in 0..100 {
            let m = invert_mutation(&perm, 1.0, &mut rng);
            assert!(is_valid_permutation(&m, 10));
            assert_ne!(m, perm, "inverting a segment of length >= 2 changes the tour");
        }
    }

    #[test]
    fn test_invert_reverses_one_contiguous_segment() {
        let mut rng = create_rng(8);
        let perm = identity(12);
        for _ in 0..50 {
            let m = invert_mutation(&perm, 1.0, &mut rng);
            let changed: Vec<usize> = (0..12).filter(|&i| m[i] != perm[i]).collect();
            let (lo, hi) = (changed[0], *changed.last().unwrap());
            let expected: Vec<usize> = (lo..=hi).rev().collect();
            assert_eq!(&m[lo..=hi], expected.as_slice());
        }
    }

    #[test]
    fn test_swap_changes_exactly_two_positions() {
        let mut rng = create_rng(42);
        let perm = identity(10);
        for _ in 0..100 {
            let m = swap_mutation(&perm, 1.0, &mut rng);
            assert!(is_valid_permutation(&m, 10));
            let diff = (0..10).filter(|&i| m[i] != perm[i]).count();
            assert_eq!(diff, 2);
        }
    }

    #[test]
    fn test_zero_probability_returns_copy() {
        let mut rng = create_rng(42);
        let perm = vec![4, 2, 0, 3, 1];
        for _ in 0..50 {
            assert_eq!(invert_mutation(&perm, 0.0, &mut rng), perm);
            assert_eq!(swap_mutation(&perm, 0.0, &mut rng), perm);
        }
    }

    #[test]
    fn test_mutation_single_element() {
        let mut rng = create_rng(42);
        assert_eq!(invert_mutation(&[0], 1.0, &mut rng), vec![0]);
        assert_eq!(swap_mutation(&[0], 1.0, &mut rng), vec![0]);
    }

    #[test]
    fn test_mutation_rate_is_respected() {
        let mut rng = create_rng(77);
        let perm = identity(30);
        let trials = 4000;
        let hits = (0..trials)
            .filter(|_| swap_mutation(&perm, 0.25, &mut rng) != perm)
            .count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.25).abs() < 0.03, "observed rate {rate}");
    }

    // ---- Pipeline ----

    #[test]
    fn test_full_pipeline_preserves_validity() {
        let mut rng = create_rng(42);
        let p1 = identity(20);
        let p2 = reversed(20);
        for _ in 0..50 {
            let c = order_crossover(&p1, &p2, &mut rng);
            let c = swap_mutation(&c, 0.5, &mut rng);
            let c = invert_mutation(&c, 0.5, &mut rng);
            assert!(is_valid_permutation(&c, 20), "pipeline child invalid: {c:?}");

            let c = pmx_crossover(&p1, &p2, &mut rng).unwrap();
            let c = invert_mutation(&c, 0.5, &mut rng);
            assert!(is_valid_permutation(&c, 20), "pipeline child invalid: {c:?}");
        }
    }
}
