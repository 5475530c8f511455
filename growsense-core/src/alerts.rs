//! Threshold-Based Alert Classification
//!
//! ## Overview
//!
//! Turns the latest values and derived metrics of one cycle into an ordered
//! list of alert records. Each profile owns a fixed sequence of rule blocks;
//! blocks are evaluated in table order so the output order is reproducible.
//!
//! ## Rule Blocks
//!
//! | Profile       | Variable      | Rule                                              |
//! |---------------|---------------|---------------------------------------------------|
//! | Environmental | `temperature` | `> 30` error, `< 15` warning, else info           |
//! | Environmental | `humidity`    | `< 40` warning, `> 80` warning, else info         |
//! | Inertial      | `accel_total` | `> 2.0` warning, else info                        |
//!
//! A block whose variable is absent emits nothing. Blocks never share state:
//! each reads its own value and its own [`ThresholdBand`].
//!
//! ## Thresholds
//!
//! Threshold values are not part of the control flow. They come from a
//! [`Thresholds`] table keyed by `(profile, variable)`, which defaults to the
//! constants in [`crate::constants::alerts`] and can be overridden from JSON:
//!
//! ```rust
//! use growsense_core::alerts::Thresholds;
//! use growsense_core::SensorProfile;
//!
//! let thresholds = Thresholds::from_json(r#"{
//!     "environmental": { "temperature": { "error_high": 28.0 } }
//! }"#)?;
//!
//! let band = thresholds.band(SensorProfile::Environmental, "temperature").unwrap();
//! assert_eq!(band.error_high, Some(28.0));
//! assert_eq!(band.warning_low, Some(15.0)); // untouched default
//! # Ok::<(), growsense_core::errors::ThresholdError>(())
//! ```

use core::fmt;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    constants::alerts::{
        HUMIDITY_HIGH_WARNING_PCT, HUMIDITY_LOW_WARNING_PCT, TEMP_HIGH_ERROR_C,
        TEMP_LOW_WARNING_C, VIBRATION_WARNING_G,
    },
    constants::fields::{ACCEL_TOTAL, HUMIDITY, TEMPERATURE},
    derived::DerivedMetrics,
    errors::ThresholdResult,
    latest::LatestValues,
    profile::SensorProfile,
};

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Condition is nominal
    Info,
    /// Condition needs attention
    Warning,
    /// Condition harms the crop
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One classified condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// How serious the condition is
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
}

impl AlertRecord {
    /// Build a record
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { severity, message: message.into() }
    }
}

/// Threshold set for one `(profile, variable)` pair
///
/// Any bound may be unset. Values strictly beyond a bound trigger it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdBand {
    /// Below this: error
    pub error_low: Option<f64>,
    /// Below this: warning
    pub warning_low: Option<f64>,
    /// Above this: warning
    pub warning_high: Option<f64>,
    /// Above this: error
    pub error_high: Option<f64>,
}

impl ThresholdBand {
    /// Replace every bound `other` sets. Unset bounds in `other` leave
    /// `self` untouched, so a merge can move a bound but never remove one.
    pub fn merge(&mut self, other: &ThresholdBand) {
        self.error_low = other.error_low.or(self.error_low);
        self.warning_low = other.warning_low.or(self.warning_low);
        self.warning_high = other.warning_high.or(self.warning_high);
        self.error_high = other.error_high.or(self.error_high);
    }
}

/// Which bound a value crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    ErrorHigh,
    ErrorLow,
    WarningHigh,
    WarningLow,
    Nominal,
}

impl ThresholdBand {
    /// Errors take precedence over warnings; high is checked before low
    fn crossing(&self, value: f64) -> Crossing {
        let above = |bound: Option<f64>| bound.is_some_and(|b| value > b);
        let below = |bound: Option<f64>| bound.is_some_and(|b| value < b);

        if above(self.error_high) {
            Crossing::ErrorHigh
        } else if below(self.error_low) {
            Crossing::ErrorLow
        } else if above(self.warning_high) {
            Crossing::WarningHigh
        } else if below(self.warning_low) {
            Crossing::WarningLow
        } else {
            Crossing::Nominal
        }
    }
}

/// Threshold bands keyed by profile, then variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds {
    bands: BTreeMap<SensorProfile, BTreeMap<String, ThresholdBand>>,
}

impl Default for Thresholds {
    fn default() -> Self {
        let mut thresholds = Self { bands: BTreeMap::new() };
        thresholds.set(
            SensorProfile::Environmental,
            TEMPERATURE,
            ThresholdBand {
                warning_low: Some(TEMP_LOW_WARNING_C),
                error_high: Some(TEMP_HIGH_ERROR_C),
                ..ThresholdBand::default()
            },
        );
        thresholds.set(
            SensorProfile::Environmental,
            HUMIDITY,
            ThresholdBand {
                warning_low: Some(HUMIDITY_LOW_WARNING_PCT),
                warning_high: Some(HUMIDITY_HIGH_WARNING_PCT),
                ..ThresholdBand::default()
            },
        );
        thresholds.set(
            SensorProfile::Inertial,
            ACCEL_TOTAL,
            ThresholdBand {
                warning_high: Some(VIBRATION_WARNING_G),
                ..ThresholdBand::default()
            },
        );
        thresholds
    }
}

impl Thresholds {
    /// Band for `(profile, variable)`
    pub fn band(&self, profile: SensorProfile, variable: &str) -> Option<&ThresholdBand> {
        self.bands.get(&profile).and_then(|vars| vars.get(variable))
    }

    /// Replace the band for `(profile, variable)`
    pub fn set(&mut self, profile: SensorProfile, variable: &str, band: ThresholdBand) {
        self.bands
            .entry(profile)
            .or_default()
            .insert(variable.to_string(), band);
    }

    /// Merge `overrides` on top of these thresholds, bound by bound
    pub fn apply(&mut self, overrides: &Thresholds) {
        for (profile, vars) in &overrides.bands {
            for (variable, band) in vars {
                self.bands
                    .entry(*profile)
                    .or_default()
                    .entry(variable.clone())
                    .or_default()
                    .merge(band);
            }
        }
    }

    /// Defaults with the overrides in `json` applied
    ///
    /// Overrides move bounds; they cannot remove a default one. `null` and
    /// an absent key both mean "keep the default". To silence a bound, move
    /// it out of reach (for example `"warning_low": -1000.0`) or build the
    /// table with [`Thresholds::set`].
    pub fn from_json(json: &str) -> ThresholdResult<Self> {
        let overrides: Thresholds = serde_json::from_str(json)?;
        let mut thresholds = Thresholds::default();
        thresholds.apply(&overrides);
        Ok(thresholds)
    }

    /// Defaults with the overrides in the JSON file at `path` applied
    pub fn load(path: impl AsRef<Path>) -> ThresholdResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let thresholds = Self::from_json(&json)?;
        log::info!("loaded threshold overrides from {}", path.display());
        Ok(thresholds)
    }
}

/// Where a rule reads its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// A latest value from the store
    Latest,
    /// A derived metric
    Derived,
}

/// Messages a rule block emits for each crossing
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMessages {
    /// Emitted above `error_high`
    pub error_high: Option<&'static str>,
    /// Emitted below `error_low`
    pub error_low: Option<&'static str>,
    /// Emitted above `warning_high`
    pub warning_high: Option<&'static str>,
    /// Emitted below `warning_low`
    pub warning_low: Option<&'static str>,
    /// Emitted when no bound is crossed
    pub nominal: &'static str,
}

/// One rule block
#[derive(Debug, Clone, Copy)]
pub struct AlertRule {
    /// Profile the block belongs to
    pub profile: SensorProfile,
    /// Variable or derived metric checked
    pub variable: &'static str,
    /// Where the value comes from
    pub source: ValueSource,
    /// Messages per crossing
    pub messages: RuleMessages,
}

impl AlertRule {
    /// Classify this block, `None` when its value is absent
    pub fn evaluate(
        &self,
        latest: &LatestValues,
        derived: &DerivedMetrics,
        thresholds: &Thresholds,
    ) -> Option<AlertRecord> {
        let value = match self.source {
            ValueSource::Latest => latest.get(self.variable),
            ValueSource::Derived => derived.get(self.variable).copied(),
        }?;

        let band = thresholds
            .band(self.profile, self.variable)
            .copied()
            .unwrap_or_default();

        let m = &self.messages;
        let record = match band.crossing(value) {
            Crossing::ErrorHigh => AlertRecord::new(
                Severity::Error,
                m.error_high.map_or_else(|| format!("{} too high", self.variable), String::from),
            ),
            Crossing::ErrorLow => AlertRecord::new(
                Severity::Error,
                m.error_low.map_or_else(|| format!("{} too low", self.variable), String::from),
            ),
            Crossing::WarningHigh => AlertRecord::new(
                Severity::Warning,
                m.warning_high.map_or_else(|| format!("high {}", self.variable), String::from),
            ),
            Crossing::WarningLow => AlertRecord::new(
                Severity::Warning,
                m.warning_low.map_or_else(|| format!("low {}", self.variable), String::from),
            ),
            Crossing::Nominal => AlertRecord::new(Severity::Info, m.nominal),
        };
        Some(record)
    }
}

/// All rule blocks, in evaluation order
pub const ALERT_RULES: &[AlertRule] = &[
    AlertRule {
        profile: SensorProfile::Environmental,
        variable: TEMPERATURE,
        source: ValueSource::Latest,
        messages: RuleMessages {
            error_high: Some("high temperature"),
            error_low: None,
            warning_high: None,
            warning_low: Some("low temperature"),
            nominal: "temperature nominal",
        },
    },
    AlertRule {
        profile: SensorProfile::Environmental,
        variable: HUMIDITY,
        source: ValueSource::Latest,
        messages: RuleMessages {
            error_high: None,
            error_low: None,
            warning_high: Some("high humidity, mold risk"),
            warning_low: Some("low humidity"),
            nominal: "humidity nominal",
        },
    },
    AlertRule {
        profile: SensorProfile::Inertial,
        variable: ACCEL_TOTAL,
        source: ValueSource::Derived,
        messages: RuleMessages {
            error_high: None,
            error_low: None,
            warning_high: Some("unusual vibration"),
            warning_low: None,
            nominal: "no significant vibration",
        },
    },
];

/// Classify one cycle's values for `profile`
pub fn classify(
    profile: SensorProfile,
    latest: &LatestValues,
    derived: &DerivedMetrics,
    thresholds: &Thresholds,
) -> Vec<AlertRecord> {
    ALERT_RULES
        .iter()
        .filter(|rule| rule.profile == profile)
        .filter_map(|rule| rule.evaluate(latest, derived, thresholds))
        .collect()
}
