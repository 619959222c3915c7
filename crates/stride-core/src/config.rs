use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_sampling_period() -> f64 {
    0.005
}
const fn default_single_support_duration() -> f64 {
    0.7
}
const fn default_double_support_duration() -> f64 {
    0.1
}

// ---------------------------------------------------------------------------
// TrajectoryConfig
// ---------------------------------------------------------------------------

/// Tunables shared by every swing trajectory strategy.
///
/// Set before a walk begins. All durations are in seconds, the lift-off angle
/// in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    /// Control sampling period (default: 0.005 = 200 Hz).
    #[serde(default = "default_sampling_period")]
    pub sampling_period: f64,

    /// Single support duration (default: 0.7).
    #[serde(default = "default_single_support_duration")]
    pub single_support_duration: f64,

    /// Double support duration (default: 0.1). Zero omits the dwell.
    #[serde(default = "default_double_support_duration")]
    pub double_support_duration: f64,

    /// Foot pitch swept at take-off and landing (default: 0).
    #[serde(default)]
    pub lift_off_angle: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            sampling_period: default_sampling_period(),
            single_support_duration: default_single_support_duration(),
            double_support_duration: default_double_support_duration(),
            lift_off_angle: 0.0,
        }
    }
}

impl TrajectoryConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sampling_period.is_finite() && self.sampling_period > 0.0) {
            return Err(ConfigError::InvalidSamplingPeriod(self.sampling_period));
        }
        if !(self.single_support_duration.is_finite() && self.single_support_duration > 0.0) {
            return Err(ConfigError::InvalidDuration {
                field: "single_support_duration",
                value: self.single_support_duration,
                message: "must be > 0",
            });
        }
        if self.single_support_duration < self.sampling_period {
            return Err(ConfigError::InvalidDuration {
                field: "single_support_duration",
                value: self.single_support_duration,
                message: "must be >= sampling_period",
            });
        }
        if !(self.double_support_duration.is_finite() && self.double_support_duration >= 0.0) {
            return Err(ConfigError::InvalidDuration {
                field: "double_support_duration",
                value: self.double_support_duration,
                message: "must be >= 0",
            });
        }
        if !(self.lift_off_angle.is_finite() && self.lift_off_angle.abs() < 90.0) {
            return Err(ConfigError::InvalidLiftOffAngle(self.lift_off_angle));
        }
        Ok(())
    }

    /// Control rate in Hz.
    pub fn control_hz(&self) -> f64 {
        1.0 / self.sampling_period
    }

    /// Builder-style override of the lift-off angle (degrees).
    #[must_use]
    pub const fn with_lift_off_angle(mut self, degrees: f64) -> Self {
        self.lift_off_angle = degrees;
        self
    }

    /// Builder-style override of both phase durations (seconds).
    #[must_use]
    pub const fn with_durations(mut self, single_support: f64, double_support: f64) -> Self {
        self.single_support_duration = single_support;
        self.double_support_duration = double_support;
        self
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
