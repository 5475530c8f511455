//! Derived metrics
//!
//! Composite values computed from several latest values. Rules live in one
//! open table: a new metric is a new [`DerivedRule`] row, nothing else.
//!
//! A metric whose inputs are not all present is omitted. It is never
//! reported as zero.

use std::collections::BTreeMap;

use crate::{
    constants::fields::{ACCEL_TOTAL, ACCEL_X, ACCEL_Y, ACCEL_Z},
    latest::LatestValues,
    profile::SensorProfile,
};

/// Metric name to value
pub type DerivedMetrics = BTreeMap<String, f64>;

/// One derived metric definition
#[derive(Debug, Clone, Copy)]
pub struct DerivedRule {
    /// Profile the rule applies to
    pub profile: SensorProfile,
    /// Name the metric is registered under
    pub name: &'static str,
    /// Variables that must all be present, in the order passed to `combine`
    pub inputs: &'static [&'static str],
    /// Combining function over the input values
    pub combine: fn(&[f64]) -> f64,
}

impl DerivedRule {
    /// Evaluate against `latest`, `None` when an input is missing
    pub fn evaluate(&self, latest: &LatestValues) -> Option<f64> {
        let values = self
            .inputs
            .iter()
            .map(|name| latest.get(name))
            .collect::<Option<Vec<f64>>>()?;
        Some((self.combine)(&values))
    }
}

/// Euclidean norm of the inputs
pub fn magnitude(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// All known derived metrics
pub const DERIVED_RULES: &[DerivedRule] = &[DerivedRule {
    profile: SensorProfile::Inertial,
    name: ACCEL_TOTAL,
    inputs: &[ACCEL_X, ACCEL_Y, ACCEL_Z],
    combine: magnitude,
}];

/// Compute every metric of `profile` whose inputs are present
pub fn derive_metrics(profile: SensorProfile, latest: &LatestValues) -> DerivedMetrics {
    derive_with(DERIVED_RULES, profile, latest)
}

/// [`derive_metrics`] over a caller-supplied rule table
pub fn derive_with(
    rules: &[DerivedRule],
    profile: SensorProfile,
    latest: &LatestValues,
) -> DerivedMetrics {
    rules
        .iter()
        .filter(|rule| rule.profile == profile)
        .filter_map(|rule| {
            let value = rule.evaluate(latest);
            if value.is_none() {
                log::debug!("{}: skipping {}, inputs incomplete", profile, rule.name);
            }
            value.map(|v| (rule.name.to_string(), v))
        })
        .collect()
}
