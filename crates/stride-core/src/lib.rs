// stride-core: Foot pose and step types, geometry, config, sample clock and errors
// for biped swing-foot trajectory generation.

pub mod config;
pub mod error;
pub mod geometry;
pub mod time;
pub mod types;

pub use config::TrajectoryConfig;
pub use error::{ConfigError, PlanError, StrideError, TagError, TrajectoryError};
pub use geometry::FootGeometry;
pub use time::SampleClock;
pub use types::{
    DOUBLE_SUPPORT_OFFSET, Foot, FootPoseSample, Phase, SUPPORT_FOOT_TAG, StepSpec, StepTag,
    StepType,
};
