//! Common test utilities for integration tests
//!
//! This module provides:
//! - Row generators that mimic what the store returns
//! - Pre-built scenarios with their expected outcomes

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use growsense_core::{RawRow, SensorProfile, Severity};

/// Fixed reference instant so every run sees the same timestamps
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
}

/// Store-style row `minutes` after the base time
pub fn row_at(minutes: i64, field: &str, value: f64) -> RawRow {
    let time = base_time() + Duration::minutes(minutes);
    RawRow::new(time.to_rfc3339(), field, value)
}

/// Evenly spaced rows for one field, one per `step_minutes`
pub fn series(field: &str, values: &[f64], step_minutes: i64) -> Vec<RawRow> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| row_at(i as i64 * step_minutes, field, *v))
        .collect()
}

/// Scenario window and profile
pub struct ScenarioConfig {
    pub name: &'static str,
    pub profile: SensorProfile,
    pub start_days_back: u32,
    pub stop_days_back: u32,
}

/// Expected cycle outcome
#[derive(Default)]
pub struct ExpectedOutcomes {
    pub latest: Vec<(&'static str, f64)>,
    pub alerts: Vec<(Severity, &'static str)>,
    pub derived: Vec<(&'static str, f64)>,
}

/// Complete scenario: configuration, store batches, expectations
pub struct TestScenario {
    pub config: ScenarioConfig,
    pub batches: Vec<Vec<RawRow>>,
    pub expected: ExpectedOutcomes,
}

/// Pre-built scenario definitions
pub struct Scenarios;

impl Scenarios {
    /// Grow room heating up over the afternoon, humidity steady
    pub fn warming_grow_room() -> TestScenario {
        let mut rows = series("temperature", &[18.0, 22.0, 35.0], 60);
        rows.extend(series("humidity", &[45.0, 45.0, 45.0], 60));

        TestScenario {
            config: ScenarioConfig {
                name: "warming_grow_room",
                profile: SensorProfile::Environmental,
                start_days_back: 15,
                stop_days_back: 5,
            },
            batches: vec![rows],
            expected: ExpectedOutcomes {
                latest: vec![("humidity", 45.0), ("temperature", 35.0)],
                alerts: vec![
                    (Severity::Error, "high temperature"),
                    (Severity::Info, "humidity nominal"),
                ],
                derived: vec![],
            },
        }
    }

    /// Inertial board knocked at the last sample, axes returned in separate batches
    pub fn knocked_planter() -> TestScenario {
        let batches = vec![
            series("accel_x", &[0.0, 0.1, 3.0], 1),
            series("accel_y", &[0.0, 0.0, 4.0], 1),
            series("accel_z", &[1.0, 1.0, 0.0], 1),
            series("gyro_x", &[0.0, 2.0, 40.0], 1),
        ];

        TestScenario {
            config: ScenarioConfig {
                name: "knocked_planter",
                profile: SensorProfile::Inertial,
                start_days_back: 1,
                stop_days_back: 3,
            },
            batches,
            expected: ExpectedOutcomes {
                latest: vec![("accel_x", 3.0), ("accel_y", 4.0), ("accel_z", 0.0), ("gyro_x", 40.0)],
                alerts: vec![(Severity::Warning, "unusual vibration")],
                derived: vec![("accel_total", 5.0)],
            },
        }
    }

    /// Inertial board that only reports its gyroscope
    pub fn gyro_only() -> TestScenario {
        TestScenario {
            config: ScenarioConfig {
                name: "gyro_only",
                profile: SensorProfile::Inertial,
                start_days_back: 7,
                stop_days_back: 1,
            },
            batches: vec![series("gyro_z", &[0.5, 0.4], 10)],
            expected: ExpectedOutcomes {
                latest: vec![("gyro_z", 0.4)],
                alerts: vec![],
                derived: vec![],
            },
        }
    }

    pub fn all() -> Vec<TestScenario> {
        vec![Self::warming_grow_room(), Self::knocked_planter(), Self::gyro_only()]
    }
}
