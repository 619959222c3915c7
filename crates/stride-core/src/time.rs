use serde::{Deserialize, Serialize};

use crate::config::TrajectoryConfig;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// SampleClock
// ---------------------------------------------------------------------------

/// Integer-sample control clock.
///
/// Phase boundaries are tracked as whole sample counts and converted to
/// seconds only on output, so time never accumulates floating-point error
/// across a walk: the time of sample `i` is always `i * period`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    period: f64,
}

impl SampleClock {
    /// Create a clock with the given sampling period in seconds.
    pub fn new(period: f64) -> Result<Self, ConfigError> {
        if !(period.is_finite() && period > 0.0) {
            return Err(ConfigError::InvalidSamplingPeriod(period));
        }
        Ok(Self { period })
    }

    /// Clock for the sampling period of a configuration.
    pub fn from_config(config: &TrajectoryConfig) -> Result<Self, ConfigError> {
        Self::new(config.sampling_period)
    }

    /// Sampling period in seconds.
    #[must_use]
    pub const fn period(&self) -> f64 {
        self.period
    }

    /// Number of samples spanned by `duration` seconds.
    ///
    /// Rounds to the nearest sample: `0.7 / 0.005` is `139.99999999999997`
    /// in binary floating point and must count as 140.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn samples_for(&self, duration: f64) -> usize {
        if duration <= 0.0 {
            return 0;
        }
        (duration / self.period).round() as usize
    }

    /// Time in seconds of sample `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.period
    }

    /// Duration in seconds of `samples` consecutive samples.
    #[must_use]
    pub fn duration_of(&self, samples: usize) -> f64 {
        self.time_at(samples)
    }

    /// Index of the sample closest to `time` seconds (negative times map to 0).
    #[must_use]
    pub fn index_at(&self, time: f64) -> usize {
        self.samples_for(time)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
