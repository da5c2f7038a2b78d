//! Summary statistics: total, mean, population deviation, extremes and
//! quartiles.

use std::fmt;

use super::StatsError;

/// Statistical summary of one numeric series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub sum: f64,
    pub mean: f64,
    pub dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total {:.1} Min {:.1} Max {:.1} Median {:.1} Mean {:.1} Standard deviation {:.1}",
            self.sum, self.min, self.max, self.median, self.mean, self.dev
        )
    }
}

/// Quartiles of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Compute the summary of `input`.
pub fn summarize(input: &[f64]) -> Result<Summary, StatsError> {
    if input.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let n = input.len() as f64;
    let sum: f64 = input.iter().sum();
    let mean = sum / n;
    let variance = input.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    let mut sorted = input.to_vec();
    sorted.sort_by(f64::total_cmp);
    let quartiles = quartiles_sorted(&sorted);

    Ok(Summary {
        sum,
        mean,
        dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median: quartiles.q2,
        q1: quartiles.q1,
        q3: quartiles.q3,
    })
}

/// Compute the quartiles of `input`.
///
/// Q1 and Q3 are the medians of the lower and upper halves; for an odd count
/// the middle element belongs to neither half. A single value is its own
/// quartiles.
pub fn quartiles(input: &[f64]) -> Result<Quartiles, StatsError> {
    if input.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    let mut sorted = input.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(quartiles_sorted(&sorted))
}

fn quartiles_sorted(sorted: &[f64]) -> Quartiles {
    let len = sorted.len();
    let q2 = median_sorted(sorted);
    if len == 1 {
        return Quartiles { q1: q2, q2, q3: q2 };
    }

    let (lower_end, upper_start) = if len % 2 == 0 {
        (len / 2, len / 2)
    } else {
        ((len - 1) / 2, (len + 1) / 2)
    };

    Quartiles {
        q1: median_sorted(&sorted[..lower_end]),
        q2,
        q3: median_sorted(&sorted[upper_start..]),
    }
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
