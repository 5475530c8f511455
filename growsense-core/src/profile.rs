//! Sensor profiles
//!
//! A profile names a class of device and fixes what the pipeline asks the
//! store for. Everything profile-specific is looked up through
//! [`SensorProfile::spec`]; adding a device means adding a variant and one
//! table row here, plus its rule blocks in `derived` and `alerts`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::fields::{
    ACCEL_X, ACCEL_Y, ACCEL_Z, ENVIRONMENTAL_MEASUREMENT, GYRO_X, GYRO_Y, GYRO_Z, HEAT_INDEX,
    HEAT_INDEX_ES, HUMIDITY, HUMIDITY_ES, INERTIAL_MEASUREMENT, TEMPERATURE, TEMPERATURE_ES,
};

/// Sensor class being reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorProfile {
    /// Temperature and humidity node (DHT22)
    Environmental,
    /// Accelerometer/gyroscope node (MPU6050)
    Inertial,
}

/// Static description of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSpec {
    /// Measurement identifier in the store
    pub measurement: &'static str,
    /// Ordered canonical field set the query filters on
    pub fields: &'static [&'static str],
    /// Other names the firmware may store a canonical field under
    pub aliases: &'static [FieldAlias],
}

/// Store field name standing in for a canonical variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAlias {
    /// Name as written to the store
    pub stored: &'static str,
    /// Canonical variable it reports
    pub variable: &'static str,
}

const ENVIRONMENTAL_SPEC: ProfileSpec = ProfileSpec {
    measurement: ENVIRONMENTAL_MEASUREMENT,
    fields: &[HUMIDITY, TEMPERATURE, HEAT_INDEX],
    aliases: &[
        FieldAlias { stored: HUMIDITY_ES, variable: HUMIDITY },
        FieldAlias { stored: TEMPERATURE_ES, variable: TEMPERATURE },
        FieldAlias { stored: HEAT_INDEX_ES, variable: HEAT_INDEX },
    ],
};

const INERTIAL_SPEC: ProfileSpec = ProfileSpec {
    measurement: INERTIAL_MEASUREMENT,
    fields: &[ACCEL_X, ACCEL_Y, ACCEL_Z, GYRO_X, GYRO_Y, GYRO_Z, TEMPERATURE],
    aliases: &[],
};

impl SensorProfile {
    /// Every profile, in selection order
    pub const ALL: [SensorProfile; 2] = [SensorProfile::Environmental, SensorProfile::Inertial];

    /// Lookup table entry for this profile
    pub const fn spec(&self) -> &'static ProfileSpec {
        match self {
            SensorProfile::Environmental => &ENVIRONMENTAL_SPEC,
            SensorProfile::Inertial => &INERTIAL_SPEC,
        }
    }

    /// Measurement identifier in the store
    pub const fn measurement(&self) -> &'static str {
        self.spec().measurement
    }

    /// Fields queried for this profile
    pub const fn fields(&self) -> &'static [&'static str] {
        self.spec().fields
    }

    /// Field aliases for this profile
    pub const fn aliases(&self) -> &'static [FieldAlias] {
        self.spec().aliases
    }

    /// Canonical lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            SensorProfile::Environmental => "environmental",
            SensorProfile::Inertial => "inertial",
        }
    }

    /// Whether `field` belongs to this profile's field set
    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// Canonical variable for a stored field name, `None` when it is not an alias
    pub fn alias_target(&self, stored: &str) -> Option<&'static str> {
        self.aliases()
            .iter()
            .find(|alias| alias.stored == stored)
            .map(|alias| alias.variable)
    }
}

impl fmt::Display for SensorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unrecognized profile names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProfile(pub String);

impl fmt::Display for UnknownProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sensor profile {:?}", self.0)
    }
}

impl std::error::Error for UnknownProfile {}

impl FromStr for SensorProfile {
    type Err = UnknownProfile;

    /// Accepts profile names and the device model names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environmental" | "dht22" => Ok(SensorProfile::Environmental),
            "inertial" | "mpu6050" => Ok(SensorProfile::Inertial),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}
