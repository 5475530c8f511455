//! Query construction
//!
//! Builds a store-agnostic description of what to fetch for one cycle. The
//! descriptor is plain data; connectors decide how to ship it. Flux rendering
//! is provided because it is what the deployed store speaks.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{normalize::RawRow, profile::SensorProfile, window::TimeWindow};

/// Everything a store needs to answer one cycle's query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Bucket or source identifier (external configuration)
    pub source: String,
    /// Range start, days before query execution
    pub range_start_days: u32,
    /// Range stop, days before query execution
    pub range_stop_days: u32,
    /// Measurement equality predicate
    pub measurement: String,
    /// Disjunctive field equality predicate, canonical names
    pub fields: Vec<String>,
    /// `(stored, variable)` pairs: extra field names accepted by the
    /// predicate and renamed to their canonical variable
    #[serde(default)]
    pub aliases: Vec<(String, String)>,
}

/// Build the query for `profile` over `window` against `source`
pub fn build(profile: SensorProfile, window: TimeWindow, source: &str) -> QueryDescriptor {
    let spec = profile.spec();
    QueryDescriptor {
        source: source.to_string(),
        range_start_days: window.start(),
        range_stop_days: window.stop(),
        measurement: spec.measurement.to_string(),
        fields: spec.fields.iter().map(|f| f.to_string()).collect(),
        aliases: spec
            .aliases
            .iter()
            .map(|a| (a.stored.to_string(), a.variable.to_string()))
            .collect(),
    }
}

impl QueryDescriptor {
    /// Whether a row with this measurement and field satisfies the predicates
    pub fn matches(&self, measurement: &str, field: &str) -> bool {
        self.measurement == measurement && self.store_fields().any(|f| f == field)
    }

    /// Every field name the predicate accepts: canonical names, then aliases
    pub fn store_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(self.aliases.iter().map(|(stored, _)| stored.as_str()))
    }

    /// Canonical variable for a stored field name
    pub fn variable_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(stored, _)| stored == field)
            .map_or(field, |(_, variable)| variable.as_str())
    }

    /// Rename aliased fields in a store answer to their canonical variable
    pub fn canonicalize(&self, mut batches: Vec<Vec<RawRow>>) -> Vec<Vec<RawRow>> {
        for row in batches.iter_mut().flatten() {
            if let Some((_, variable)) = self.aliases.iter().find(|(stored, _)| *stored == row.field) {
                row.field = variable.clone();
            }
        }
        batches
    }

    /// Render as a Flux query
    pub fn to_flux(&self) -> String {
        let stop = if self.range_stop_days == 0 {
            "now()".to_string()
        } else {
            format!("-{}d", self.range_stop_days)
        };

        let mut flux = String::new();
        let _ = writeln!(flux, "from(bucket: {})", flux_string(&self.source));
        let _ = writeln!(flux, "  |> range(start: -{}d, stop: {})", self.range_start_days, stop);
        let _ = writeln!(
            flux,
            "  |> filter(fn: (r) => r._measurement == {})",
            flux_string(&self.measurement)
        );

        let predicate = self
            .store_fields()
            .map(|f| format!("r._field == {}", flux_string(f)))
            .collect::<Vec<_>>()
            .join(" or ");
        let _ = write!(flux, "  |> filter(fn: (r) => {})", predicate);
        flux
    }
}

/// Quote a Flux string literal
fn flux_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
