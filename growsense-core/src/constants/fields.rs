//! Store Identifiers
//!
//! Measurement names and field names as written by the sensor firmware.
//! Profiles reference these through their lookup table; nothing else should
//! branch on them.

// ===== ENVIRONMENTAL (DHT22) =====

/// Measurement written by the DHT22 environmental node.
pub const ENVIRONMENTAL_MEASUREMENT: &str = "studio-dht22";

/// Relative humidity (%).
pub const HUMIDITY: &str = "humidity";

/// Air temperature (°C). Also reported by the inertial board's die sensor.
pub const TEMPERATURE: &str = "temperature";

/// Apparent temperature (°C).
pub const HEAT_INDEX: &str = "heat_index";

/// Humidity as written by the Spanish-locale DHT22 firmware.
pub const HUMIDITY_ES: &str = "humedad";

/// Temperature as written by the Spanish-locale DHT22 firmware.
pub const TEMPERATURE_ES: &str = "temperatura";

/// Heat index as written by the Spanish-locale DHT22 firmware.
pub const HEAT_INDEX_ES: &str = "sensacion_termica";

// ===== INERTIAL (MPU6050) =====

/// Measurement written by the MPU6050 inertial node.
pub const INERTIAL_MEASUREMENT: &str = "mpu6050";

/// Acceleration along X (g).
pub const ACCEL_X: &str = "accel_x";

/// Acceleration along Y (g).
pub const ACCEL_Y: &str = "accel_y";

/// Acceleration along Z (g).
pub const ACCEL_Z: &str = "accel_z";

/// Angular rate around X (°/s).
pub const GYRO_X: &str = "gyro_x";

/// Angular rate around Y (°/s).
pub const GYRO_Y: &str = "gyro_y";

/// Angular rate around Z (°/s).
pub const GYRO_Z: &str = "gyro_z";

// ===== DERIVED =====

/// Magnitude of the acceleration vector (g).
pub const ACCEL_TOTAL: &str = "accel_total";
