//! Exact reference optimum for small instances.
//!
//! Stands in for the external exact solver on instances small enough to
//! enumerate: city 0 is fixed as the start and the remaining cities are
//! explored depth-first, pruning any partial tour already longer than the
//! incumbent.

use crate::error::{Result, TspError};
use crate::instance::CitySet;
use serde::{Deserialize, Serialize};

/// Largest instance [`brute_force`] accepts (9! completions).
pub const MAX_BRUTE_FORCE_CITIES: usize = 10;

/// An optimal tour and its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactSolution {
    pub objective: f64,
    pub tour: Vec<usize>,
}

/// Finds an optimal tour by exhaustive search.
///
/// # Errors
/// [`TspError::InvalidInstance`] if the instance has more than
/// [`MAX_BRUTE_FORCE_CITIES`] cities.
pub fn brute_force(cities: &CitySet) -> Result<ExactSolution> {
    let n = cities.len();
    if n > MAX_BRUTE_FORCE_CITIES {
        return Err(TspError::instance(format!(
            "brute force supports at most {MAX_BRUTE_FORCE_CITIES} cities, got {n}"
        )));
    }

    let mut search = Search {
        cities,
        path: vec![0],
        used: vec![false; n],
        best_len: f64::INFINITY,
        best_path: Vec::new(),
    };
    search.used[0] = true;
    search.extend(0.0);

    Ok(ExactSolution {
        objective: search.best_len,
        tour: search.best_path,
    })
}

struct Search<'a> {
    cities: &'a CitySet,
    path: Vec<usize>,
    used: Vec<bool>,
    best_len: f64,
    best_path: Vec<usize>,
}

impl Search<'_> {
    fn extend(&mut self, partial: f64) {
        if partial >= self.best_len {
            return;
        }
        let n = self.cities.len();
        let last = self.path[self.path.len() - 1];

        if self.path.len() == n {
            let total = partial + self.cities.distance(last, 0);
            if total < self.best_len {
                self.best_len = total;
                self.best_path = self.path.clone();
            }
            return;
        }

        for next in 1..n {
            if self.used[next] {
                continue;
            }
            self.used[next] = true;
            self.path.push(next);
            self.extend(partial + self.cities.distance(last, next));
            self.path.pop();
            self.used[next] = false;
        }
    }
}
