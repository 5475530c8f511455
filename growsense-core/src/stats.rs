//! Descriptive statistics per variable
//!
//! Summarizes every sample in the window, not only the latest values.
//! Quantiles interpolate linearly between closest ranks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SummaryError, SummaryResult},
    normalize::CanonicalTable,
};

/// Statistics for one variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableStats {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` for a single sample
    pub std: Option<f64>,
    /// Minimum
    pub min: f64,
    /// 25th percentile
    pub p25: f64,
    /// Median
    pub p50: f64,
    /// 75th percentile
    pub p75: f64,
    /// Maximum
    pub max: f64,
}

/// Variable name to its statistics
pub type SummaryStats = BTreeMap<String, VariableStats>;

/// Summarize `table` per variable
pub fn summarize(table: &CanonicalTable) -> SummaryResult<SummaryStats> {
    if table.is_empty() {
        return Err(SummaryError::InsufficientData { required: 1, available: 0 });
    }

    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for sample in table {
        grouped.entry(sample.variable.as_str()).or_default().push(sample.value);
    }

    let summary = grouped
        .into_iter()
        .filter_map(|(variable, mut values)| {
            describe(&mut values).map(|stats| (variable.to_string(), stats))
        })
        .collect();
    Ok(summary)
}

/// Statistics of `values`, sorting them in place. `None` when empty.
pub fn describe(values: &mut [f64]) -> Option<VariableStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    });

    Some(VariableStats {
        count,
        mean,
        std,
        min: values[0],
        p25: quantile_sorted(values, 0.25)?,
        p50: quantile_sorted(values, 0.5)?,
        p75: quantile_sorted(values, 0.75)?,
        max: values[count - 1],
    })
}

/// Linear-interpolated quantile of already sorted values
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !q.is_finite() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
