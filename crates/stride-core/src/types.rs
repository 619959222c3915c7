use std::fmt;

use nalgebra::{Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, TagError};

// ---------------------------------------------------------------------------
// Foot
// ---------------------------------------------------------------------------

/// Left or right foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    /// `+1` for the left foot, `-1` for the right foot.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }

    /// The opposite foot.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Foot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("LEFT"),
            Self::Right => f.write_str("RIGHT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Support phase of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// One foot bears all weight, the other swings.
    SingleSupport,
    /// Both feet on the ground.
    DoubleSupport,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleSupport => f.write_str("SingleSupport"),
            Self::DoubleSupport => f.write_str("DoubleSupport"),
        }
    }
}

// ---------------------------------------------------------------------------
// StepType / StepTag
// ---------------------------------------------------------------------------

/// Gait context of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    #[default]
    Normal,
    /// One step before an obstacle.
    PreObstacle,
    /// First leg over the obstacle.
    FirstLegOverObstacle,
    /// Second leg over the obstacle.
    SecondLegOverObstacle,
    /// One step after the obstacle.
    PostObstacle,
}

impl StepType {
    /// Integer classification code (1..=5).
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Normal => 1,
            Self::PreObstacle => 2,
            Self::FirstLegOverObstacle => 3,
            Self::SecondLegOverObstacle => 4,
            Self::PostObstacle => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: i32) -> Result<Self, TagError> {
        match code {
            1 => Ok(Self::Normal),
            2 => Ok(Self::PreObstacle),
            3 => Ok(Self::FirstLegOverObstacle),
            4 => Ok(Self::SecondLegOverObstacle),
            5 => Ok(Self::PostObstacle),
            other => Err(TagError(other)),
        }
    }
}

/// Offset added to the step code on double support samples.
pub const DOUBLE_SUPPORT_OFFSET: i32 = 10;

/// Raw tag of a support foot sample during single support.
pub const SUPPORT_FOOT_TAG: i32 = -1;

/// Phase/step classification carried by every [`FootPoseSample`].
///
/// Serialized as the integer encoding consumers of the sample stream expect:
/// the step code for a swing sample, code + 10 in double support, -1 for the
/// support foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum StepTag {
    /// Support foot during single support.
    Support,
    /// Swinging foot during single support.
    Swing(StepType),
    /// Either foot during double support.
    DoubleSupport(StepType),
}

impl StepTag {
    /// Tag of a swing-side sample for `step_type` in `phase`.
    #[must_use]
    pub const fn for_phase(step_type: StepType, phase: Phase) -> Self {
        match phase {
            Phase::SingleSupport => Self::Swing(step_type),
            Phase::DoubleSupport => Self::DoubleSupport(step_type),
        }
    }

    /// Integer encoding.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Support => SUPPORT_FOOT_TAG,
            Self::Swing(step_type) => step_type.code(),
            Self::DoubleSupport(step_type) => step_type.code() + DOUBLE_SUPPORT_OFFSET,
        }
    }

    /// Decode the integer encoding.
    pub const fn from_raw(raw: i32) -> Result<Self, TagError> {
        if raw == SUPPORT_FOOT_TAG {
            return Ok(Self::Support);
        }
        if raw > DOUBLE_SUPPORT_OFFSET {
            return match StepType::from_code(raw - DOUBLE_SUPPORT_OFFSET) {
                Ok(step_type) => Ok(Self::DoubleSupport(step_type)),
                Err(_) => Err(TagError(raw)),
            };
        }
        match StepType::from_code(raw) {
            Ok(step_type) => Ok(Self::Swing(step_type)),
            Err(_) => Err(TagError(raw)),
        }
    }

    /// Step type, if this is not a support foot sample.
    #[must_use]
    pub const fn step_type(self) -> Option<StepType> {
        match self {
            Self::Support => None,
            Self::Swing(step_type) | Self::DoubleSupport(step_type) => Some(step_type),
        }
    }

    /// Phase the tagged sample belongs to.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Support | Self::Swing(_) => Phase::SingleSupport,
            Self::DoubleSupport(_) => Phase::DoubleSupport,
        }
    }
}

impl From<StepTag> for i32 {
    fn from(tag: StepTag) -> Self {
        tag.raw()
    }
}

impl TryFrom<i32> for StepTag {
    type Error = TagError;

    fn try_from(raw: i32) -> Result<Self, TagError> {
        Self::from_raw(raw)
    }
}

// ---------------------------------------------------------------------------
// FootPoseSample
// ---------------------------------------------------------------------------

/// One time-stamped kinematic sample of a foot.
///
/// Positions in meters, angles in degrees. `omega` is the toe/heel pitch
/// swept at take-off and landing, `omega2` a secondary rotation reserved for
/// obstacle clearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootPoseSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub theta: f64,
    pub omega: f64,
    pub omega2: f64,

    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub dtheta: f64,
    pub domega: f64,
    pub domega2: f64,

    pub ddx: f64,
    pub ddy: f64,
    pub ddz: f64,
    pub ddtheta: f64,
    pub ddomega: f64,
    pub ddomega2: f64,

    /// Time at which this pose should be reached (seconds).
    pub time: f64,
    pub step_type: StepTag,
}

impl FootPoseSample {
    /// Foot standing still at `(x, y, z)` with heading `theta` (degrees).
    #[must_use]
    pub const fn standing(x: f64, y: f64, z: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            z,
            theta,
            omega: 0.0,
            omega2: 0.0,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            dtheta: 0.0,
            domega: 0.0,
            domega2: 0.0,
            ddx: 0.0,
            ddy: 0.0,
            ddz: 0.0,
            ddtheta: 0.0,
            ddomega: 0.0,
            ddomega2: 0.0,
            time: 0.0,
            step_type: StepTag::DoubleSupport(StepType::Normal),
        }
    }

    /// Constant hold of this pose at `time`: same position and angles, every
    /// derivative zero.
    #[must_use]
    pub const fn hold(&self, time: f64, step_type: StepTag) -> Self {
        let mut held = Self::standing(self.x, self.y, self.z, self.theta);
        held.omega = self.omega;
        held.omega2 = self.omega2;
        held.time = time;
        held.step_type = step_type;
        held
    }

    /// `true` when every first and second derivative is exactly zero.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_at_rest(&self) -> bool {
        [
            self.dx,
            self.dy,
            self.dz,
            self.dtheta,
            self.domega,
            self.domega2,
            self.ddx,
            self.ddy,
            self.ddz,
            self.ddtheta,
            self.ddomega,
            self.ddomega2,
        ]
        .iter()
        .all(|&v| v == 0.0)
    }

    /// Position `[x, y, z]`.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Velocity `[dx, dy, dz]`.
    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.dx, self.dy, self.dz)
    }

    /// Acceleration `[ddx, ddy, ddz]`.
    #[must_use]
    pub fn acceleration(&self) -> Vector3<f64> {
        Vector3::new(self.ddx, self.ddy, self.ddz)
    }
}

impl fmt::Display for FootPoseSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "x {} y {} z {} theta {} omega {} omega2 {}",
            self.x, self.y, self.z, self.theta, self.omega, self.omega2
        )?;
        writeln!(
            f,
            "dx {} dy {} dz {} dtheta {} domega {} domega2 {}",
            self.dx, self.dy, self.dz, self.dtheta, self.domega, self.domega2
        )?;
        writeln!(
            f,
            "ddx {} ddy {} ddz {} ddtheta {} ddomega {} ddomega2 {}",
            self.ddx, self.ddy, self.ddz, self.ddtheta, self.ddomega, self.ddomega2
        )?;
        write!(f, "time {} stepType {}", self.time, self.step_type.raw())
    }
}

// ---------------------------------------------------------------------------
// StepSpec
// ---------------------------------------------------------------------------

/// Relative foot placement requested by the step planner.
///
/// `sx`/`sy` are expressed in the heading frame of the current support foot,
/// `theta` is the heading change in degrees. The step consists of a double
/// support dwell of `ds_time` followed by a swing of `ss_time` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub sx: f64,
    pub sy: f64,
    pub theta: f64,
    pub ss_time: f64,
    pub ds_time: f64,
    #[serde(default)]
    pub step_type: StepType,
    /// Lateral hip height deviation used by some strategies (meters).
    #[serde(default)]
    pub hip_height_deviation: f64,
}

impl StepSpec {
    /// Normal step with explicit timing.
    #[must_use]
    pub const fn new(sx: f64, sy: f64, theta: f64, ss_time: f64, ds_time: f64) -> Self {
        Self {
            sx,
            sy,
            theta,
            ss_time,
            ds_time,
            step_type: StepType::Normal,
            hip_height_deviation: 0.0,
        }
    }

    /// Normal step timed with the configured phase durations.
    #[must_use]
    pub const fn with_timing(
        sx: f64,
        sy: f64,
        theta: f64,
        config: &crate::config::TrajectoryConfig,
    ) -> Self {
        Self::new(
            sx,
            sy,
            theta,
            config.single_support_duration,
            config.double_support_duration,
        )
    }

    /// Builder-style override of the step classification.
    #[must_use]
    pub const fn with_step_type(mut self, step_type: StepType) -> Self {
        self.step_type = step_type;
        self
    }

    /// Builder-style override of the hip height deviation.
    #[must_use]
    pub const fn with_hip_height_deviation(mut self, deviation: f64) -> Self {
        self.hip_height_deviation = deviation;
        self
    }

    /// Check durations and offsets. `index` is the step's position in its
    /// plan, used only for reporting.
    pub fn validate(&self, index: usize) -> Result<(), PlanError> {
        for (field, value) in [
            ("sx", self.sx),
            ("sy", self.sy),
            ("theta", self.theta),
            ("ss_time", self.ss_time),
            ("ds_time", self.ds_time),
            ("hip_height_deviation", self.hip_height_deviation),
        ] {
            if !value.is_finite() {
                return Err(PlanError::NonFiniteStep { step: index, field });
            }
        }
        if self.ss_time <= 0.0 {
            return Err(PlanError::InvalidSingleSupport {
                step: index,
                value: self.ss_time,
            });
        }
        if self.ds_time < 0.0 {
            return Err(PlanError::InvalidDoubleSupport {
                step: index,
                value: self.ds_time,
            });
        }
        Ok(())
    }

    /// Absolute landing pose `(x, y, theta)` of the swing foot for a support
    /// foot at `(x, y)` with heading `theta` (degrees).
    #[must_use]
    pub fn landing_pose(&self, x: f64, y: f64, theta: f64) -> (f64, f64, f64) {
        let offset = Rotation2::new(theta.to_radians()) * Vector2::new(self.sx, self.sy);
        (x + offset.x, y + offset.y, theta + self.theta)
    }
}

impl fmt::Display for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sx {} sy {} theta {}", self.sx, self.sy, self.theta)?;
        write!(
            f,
            "SStime {} DStime {} stepType {} DeviationHipHeight {}",
            self.ss_time,
            self.ds_time,
            self.step_type.code(),
            self.hip_height_deviation
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn foot_sign_and_other() {
        assert_eq!(Foot::Left.sign(), 1);
        assert_eq!(Foot::Right.sign(), -1);
        assert_eq!(Foot::Left.other(), Foot::Right);
        assert_eq!(Foot::Right.other().other(), Foot::Right);
        assert_eq!(Foot::Left.to_string(), "LEFT");
        assert_eq!(Phase::DoubleSupport.to_string(), "DoubleSupport");
    }

    #[test]
    fn step_tag_encoding() {
        assert_eq!(StepTag::Support.raw(), -1);
        assert_eq!(StepTag::Swing(StepType::Normal).raw(), 1);
        assert_eq!(StepTag::Swing(StepType::PostObstacle).raw(), 5);
        assert_eq!(StepTag::DoubleSupport(StepType::Normal).raw(), 11);
        assert_eq!(
            StepTag::DoubleSupport(StepType::FirstLegOverObstacle).raw(),
            13
        );
    }

    #[test]
    fn step_tag_decoding() {
        for raw in [-1, 1, 2, 3, 4, 5, 11, 12, 13, 14, 15] {
            let tag = StepTag::from_raw(raw).unwrap();
            assert_eq!(tag.raw(), raw);
        }
        for raw in [0, 6, 10, 16, -2, 100] {
            assert_eq!(StepTag::from_raw(raw), Err(TagError(raw)));
        }
    }

    #[test]
    fn step_tag_phase_and_type() {
        let tag = StepTag::for_phase(StepType::PreObstacle, Phase::DoubleSupport);
        assert_eq!(tag, StepTag::DoubleSupport(StepType::PreObstacle));
        assert_eq!(tag.phase(), Phase::DoubleSupport);
        assert_eq!(tag.step_type(), Some(StepType::PreObstacle));
        assert_eq!(StepTag::Support.step_type(), None);
    }

    #[test]
    fn hold_zeroes_derivatives() {
        let mut moving = FootPoseSample::standing(0.1, 0.2, 0.0, 30.0);
        moving.dx = 1.0;
        moving.ddz = -3.0;
        moving.domega = 0.5;
        assert!(!moving.is_at_rest());

        let held = moving.hold(1.25, StepTag::Support);
        assert!(held.is_at_rest());
        assert_relative_eq!(held.x, 0.1);
        assert_relative_eq!(held.theta, 30.0);
        assert_relative_eq!(held.time, 1.25);
        assert_eq!(held.step_type, StepTag::Support);
    }

    #[test]
    fn step_validation() {
        assert!(StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.1).validate(0).is_ok());
        assert!(StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.0).validate(0).is_ok());
        assert_eq!(
            StepSpec::new(0.2, 0.19, 0.0, 0.0, 0.1).validate(4),
            Err(PlanError::InvalidSingleSupport {
                step: 4,
                value: 0.0
            })
        );
        assert!(matches!(
            StepSpec::new(0.2, 0.19, 0.0, 0.7, -0.1).validate(1),
            Err(PlanError::InvalidDoubleSupport { step: 1, .. })
        ));
        assert_eq!(
            StepSpec::new(f64::NAN, 0.19, 0.0, 0.7, 0.1).validate(2),
            Err(PlanError::NonFiniteStep {
                step: 2,
                field: "sx"
            })
        );
    }

    #[test]
    fn landing_pose_straight() {
        let step = StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.1);
        let (x, y, theta) = step.landing_pose(1.0, -0.095, 0.0);
        assert_relative_eq!(x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(y, 0.095, epsilon = 1e-12);
        assert_relative_eq!(theta, 0.0);
    }

    #[test]
    fn landing_pose_rotates_with_support_heading() {
        let step = StepSpec::new(0.2, 0.0, 10.0, 0.7, 0.1);
        let (x, y, theta) = step.landing_pose(0.0, 0.0, 90.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.2, epsilon = 1e-12);
        assert_relative_eq!(theta, 100.0);
    }

    #[test]
    fn with_timing_uses_config_durations() {
        let cfg = crate::config::TrajectoryConfig::default().with_durations(0.8, 0.2);
        let step = StepSpec::with_timing(0.1, 0.19, 0.0, &cfg)
            .with_step_type(StepType::PreObstacle)
            .with_hip_height_deviation(0.01);
        assert_relative_eq!(step.ss_time, 0.8);
        assert_relative_eq!(step.ds_time, 0.2);
        assert_eq!(step.step_type, StepType::PreObstacle);
        assert_relative_eq!(step.hip_height_deviation, 0.01);
    }

    #[test]
    fn step_spec_from_toml() {
        let step: StepSpec = toml::from_str(
            "sx = 0.2\nsy = -0.19\ntheta = 5.0\n\
             ss_time = 0.7\nds_time = 0.1\n\
             step_type = \"pre_obstacle\"\n",
        )
        .unwrap();
        assert_eq!(step.step_type, StepType::PreObstacle);
        assert_relative_eq!(step.hip_height_deviation, 0.0);
    }

    #[test]
    fn display_matches_dump_layout() {
        let sample = FootPoseSample::standing(0.0, 0.1, 0.0, 0.0);
        let dump = sample.to_string();
        assert_eq!(dump.lines().count(), 4);
        assert!(dump.starts_with("x 0 y 0.1 z 0"));
        assert!(dump.ends_with("time 0 stepType 11"));

        let step = StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.1);
        assert!(step.to_string().contains("SStime 0.7 DStime 0.1 stepType 1"));
    }
}
