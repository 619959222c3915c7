use thiserror::Error;

use crate::types::Foot;

/// Top-level error type for stride crates.
#[derive(Debug, Error)]
pub enum StrideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid sampling_period: {0} (must be > 0)")]
    InvalidSamplingPeriod(f64),

    #[error("Invalid {field}: {value} ({message})")]
    InvalidDuration {
        field: &'static str,
        value: f64,
        message: &'static str,
    },

    #[error("Invalid lift_off_angle: {0} deg (must be within (-90, 90))")]
    InvalidLiftOffAngle(f64),

    #[error("Invalid foot geometry: {0}")]
    InvalidGeometry(&'static str),

    #[error("Invalid step_height: {0} (must be finite and >= 0)")]
    InvalidStepHeight(f64),
}

/// Step plan errors, reported with the index of the offending step.
///
/// Copy + static messages, like every error raised on the control path.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlanError {
    #[error("Step {step}: single support time {value} must be > 0")]
    InvalidSingleSupport { step: usize, value: f64 },

    #[error("Step {step}: double support time {value} must be >= 0")]
    InvalidDoubleSupport { step: usize, value: f64 },

    #[error("Step {step}: non-finite {field}")]
    NonFiniteStep { step: usize, field: &'static str },

    #[error("Step {step}: single support time {value} is shorter than one sampling period")]
    SingleSupportBelowPeriod { step: usize, value: f64 },
}

/// Errors raised by trajectory generator updates.
///
/// Every check runs before the first write, so a failed update leaves both
/// output sequences untouched.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("Internal state not initialized (call initialize_internal_state)")]
    NotInitialized,

    #[error("No swing segment planned")]
    NoSwingPlanned,

    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Window start {initial} is after target index {current}")]
    WindowStartAfterIndex { current: usize, initial: usize },

    #[error("Invalid modulated single support time: {0} (must be > 0)")]
    InvalidModulatedTime(f64),

    #[error("Swing planned for the {planned} foot, update requested for {requested}")]
    SideMismatch { planned: Foot, requested: Foot },

    #[error("Invalid parameters: {0}")]
    Config(#[from] ConfigError),
}

/// Unknown integer step classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown step tag: {0}")]
pub struct TagError(pub i32);
