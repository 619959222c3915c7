//! Trajectory generator contract.
//!
//! A strategy writes, for one control tick, the support foot pose and the
//! swinging foot pose into two caller-owned sample sequences. Sequences are
//! addressed by absolute sample index and are never resized.
//!
//! A swing window is anchored on the rest sample the foot lifts off from
//! (`index_initial`, local time zero); single support ticks follow it at
//! local times of one period and up.
//!
//! Every strategy must guarantee:
//!
//! - the swing trajectory is continuous up to acceleration at both ends of the
//!   single support window and lands flat with zero velocity and acceleration;
//! - `omega` rises from zero pivoting about the toe early in the swing and
//!   returns to zero pivoting about the heel before touch-down, with continuous
//!   derivatives (`omega2` follows the same rules when used);
//! - swing samples carry [`StepTag::Swing`], support samples
//!   [`StepTag::Support`], double support samples [`StepTag::DoubleSupport`];
//! - updates are deterministic, and the absolute and windowed updates produce
//!   bit-identical samples for the same instant when the window starts at
//!   local time zero;
//! - indices are checked before anything is written.

use stride_core::{
    ConfigError, Foot, FootGeometry, FootPoseSample, StepSpec, StepTag, StepType,
    TrajectoryConfig, TrajectoryError,
};

// ---------------------------------------------------------------------------
// TrajectoryParams
// ---------------------------------------------------------------------------

/// Tunables shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryParams {
    /// Control sampling period in seconds.
    pub sampling_period: f64,
    /// Nominal single support duration in seconds.
    pub single_support_time: f64,
    /// Nominal double support duration in seconds.
    pub double_support_time: f64,
    /// Lift-off and landing foot pitch in degrees.
    pub omega: f64,
}

impl Default for TrajectoryParams {
    fn default() -> Self {
        Self::from(&TrajectoryConfig::default())
    }
}

impl From<&TrajectoryConfig> for TrajectoryParams {
    fn from(config: &TrajectoryConfig) -> Self {
        Self {
            sampling_period: config.sampling_period,
            single_support_time: config.single_support_duration,
            double_support_time: config.double_support_duration,
            omega: config.lift_off_angle,
        }
    }
}

impl TrajectoryParams {
    /// Same checks as [`TrajectoryConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        TrajectoryConfig {
            sampling_period: self.sampling_period,
            single_support_duration: self.single_support_time,
            double_support_duration: self.double_support_time,
            lift_off_angle: self.omega,
        }
        .validate()
    }
}

// ---------------------------------------------------------------------------
// FootTrajectoryGenerator
// ---------------------------------------------------------------------------

/// Contract for swing foot interpolation strategies.
pub trait FootTrajectoryGenerator {
    /// Shared tunables.
    fn params(&self) -> &TrajectoryParams;

    /// Mutable access to the shared tunables. Call
    /// [`release_internal_state`](Self::release_internal_state) and
    /// re-initialize after changing them directly.
    fn params_mut(&mut self) -> &mut TrajectoryParams;

    /// Geometry of the foot this strategy moves.
    fn foot_geometry(&self) -> &FootGeometry;

    /// Derive internal structures from the current tunables.
    fn initialize_internal_state(&mut self) -> Result<(), TrajectoryError>;

    /// Drop derived structures. Updates fail with
    /// [`TrajectoryError::NotInitialized`] until re-initialized.
    fn release_internal_state(&mut self);

    /// Write the support hold and the swing pose at `current_index`.
    ///
    /// The swing window started at `index_initial`; local interpolation time
    /// is `(current_index - index_initial) * sampling_period`. `index_initial`
    /// is the rest sample the foot lifts off from (local time zero), so the
    /// first single support tick is already one period into the swing and
    /// carries a slightly nonzero `omega`. With a window of
    /// `modulated_single_support_time / sampling_period` samples the last
    /// single support tick reaches the landing exactly.
    #[allow(clippy::too_many_arguments)]
    fn update_foot_position(
        &self,
        support: &mut [FootPoseSample],
        swing: &mut [FootPoseSample],
        current_index: usize,
        index_initial: usize,
        modulated_single_support_time: f64,
        step_type: StepType,
        side: Foot,
    ) -> Result<(), TrajectoryError>;

    /// Write the support hold and the swing pose at `start_index + k`, at
    /// local interpolation time
    /// `local_interpolation_start_time + k * sampling_period`.
    #[allow(clippy::too_many_arguments)]
    fn update_foot_position_window(
        &self,
        support: &mut [FootPoseSample],
        swing: &mut [FootPoseSample],
        start_index: usize,
        k: usize,
        local_interpolation_start_time: f64,
        modulated_single_support_time: f64,
        step_type: StepType,
        side: Foot,
    ) -> Result<(), TrajectoryError>;

    fn sampling_period(&self) -> f64 {
        self.params().sampling_period
    }

    fn set_sampling_period(&mut self, period: f64) {
        self.params_mut().sampling_period = period;
        self.release_internal_state();
    }

    fn single_support_time(&self) -> f64 {
        self.params().single_support_time
    }

    fn set_single_support_time(&mut self, time: f64) {
        self.params_mut().single_support_time = time;
        self.release_internal_state();
    }

    fn double_support_time(&self) -> f64 {
        self.params().double_support_time
    }

    fn set_double_support_time(&mut self, time: f64) {
        self.params_mut().double_support_time = time;
        self.release_internal_state();
    }

    /// Lift-off and landing pitch in degrees.
    fn omega(&self) -> f64 {
        self.params().omega
    }

    fn set_omega(&mut self, omega: f64) {
        self.params_mut().omega = omega;
        self.release_internal_state();
    }

    /// Hold both feet at `index` during double support.
    ///
    /// Each foot keeps the pose of the preceding sample (or of the sample at
    /// `index` itself when `index == 0`), with every derivative zero and the
    /// tag [`StepTag::DoubleSupport`].
    #[allow(clippy::cast_precision_loss)]
    fn hold_double_support(
        &self,
        support: &mut [FootPoseSample],
        swing: &mut [FootPoseSample],
        index: usize,
        step_type: StepType,
    ) -> Result<(), TrajectoryError> {
        ensure_index(support, index)?;
        ensure_index(swing, index)?;

        let time = index as f64 * self.sampling_period();
        let tag = StepTag::DoubleSupport(step_type);
        let source = index.saturating_sub(1);
        support[index] = support[source].hold(time, tag);
        swing[index] = swing[source].hold(time, tag);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Swing planning
// ---------------------------------------------------------------------------

/// Endpoints of one swing: the support foot it pivots around, the swing foot
/// at lift-off and the landing pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingSegment {
    pub side: Foot,
    pub support: FootPoseSample,
    pub start: FootPoseSample,
    pub landing: FootPoseSample,
}

impl SwingSegment {
    /// Segment landing `side` at `step` relative to `support`, on the support
    /// foot's ground height.
    #[must_use]
    pub fn new(
        side: Foot,
        support: &FootPoseSample,
        start: &FootPoseSample,
        step: &StepSpec,
    ) -> Self {
        let (x, y, theta) = step.landing_pose(support.x, support.y, support.theta);
        Self {
            side,
            support: *support,
            start: *start,
            landing: FootPoseSample::standing(x, y, support.z, theta),
        }
    }
}

/// Strategies that interpolate between explicitly planned endpoints.
pub trait SwingPlanner {
    /// Record the swing of `side` for `step`, starting from `swing_start`
    /// while the other foot rests at `support`.
    fn plan_swing(
        &mut self,
        side: Foot,
        support: &FootPoseSample,
        swing_start: &FootPoseSample,
        step: &StepSpec,
    );

    /// Currently planned swing, if any.
    fn planned_swing(&self) -> Option<&SwingSegment>;
}

// ---------------------------------------------------------------------------
// Checks shared by strategies
// ---------------------------------------------------------------------------

/// `IndexOutOfRange` unless `index` addresses an element of `samples`.
pub fn ensure_index(samples: &[FootPoseSample], index: usize) -> Result<(), TrajectoryError> {
    if index < samples.len() {
        Ok(())
    } else {
        Err(TrajectoryError::IndexOutOfRange {
            index,
            len: samples.len(),
        })
    }
}

/// `InvalidModulatedTime` unless `time` is a positive finite duration.
pub fn ensure_modulated_time(time: f64) -> Result<(), TrajectoryError> {
    if time.is_finite() && time > 0.0 {
        Ok(())
    } else {
        Err(TrajectoryError::InvalidModulatedTime(time))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Strategy that only counts releases; updates write holds.
    struct Holder {
        geometry: FootGeometry,
        params: TrajectoryParams,
        initialized: bool,
        releases: usize,
    }

    impl Holder {
        fn new() -> Self {
            Self {
                geometry: FootGeometry::new(Vector3::new(0.0, 0.0, 0.1), 0.1, 0.2).unwrap(),
                params: TrajectoryParams::default(),
                initialized: false,
                releases: 0,
            }
        }
    }

    impl FootTrajectoryGenerator for Holder {
        fn params(&self) -> &TrajectoryParams {
            &self.params
        }

        fn params_mut(&mut self) -> &mut TrajectoryParams {
            &mut self.params
        }

        fn foot_geometry(&self) -> &FootGeometry {
            &self.geometry
        }

        fn initialize_internal_state(&mut self) -> Result<(), TrajectoryError> {
            self.params.validate()?;
            self.initialized = true;
            Ok(())
        }

        fn release_internal_state(&mut self) {
            self.initialized = false;
            self.releases += 1;
        }

        fn update_foot_position(
            &self,
            support: &mut [FootPoseSample],
            swing: &mut [FootPoseSample],
            current_index: usize,
            _index_initial: usize,
            _modulated_single_support_time: f64,
            step_type: StepType,
            _side: Foot,
        ) -> Result<(), TrajectoryError> {
            self.hold_double_support(support, swing, current_index, step_type)
        }

        fn update_foot_position_window(
            &self,
            support: &mut [FootPoseSample],
            swing: &mut [FootPoseSample],
            start_index: usize,
            k: usize,
            _local_interpolation_start_time: f64,
            _modulated_single_support_time: f64,
            step_type: StepType,
            _side: Foot,
        ) -> Result<(), TrajectoryError> {
            self.hold_double_support(support, swing, start_index + k, step_type)
        }
    }

    #[test]
    fn params_follow_config_defaults() {
        let params = TrajectoryParams::default();
        assert_relative_eq!(params.sampling_period, 0.005);
        assert_relative_eq!(params.single_support_time, 0.7);
        assert_relative_eq!(params.double_support_time, 0.1);
        assert_relative_eq!(params.omega, 0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn params_validation_rejects_bad_values() {
        let mut params = TrajectoryParams::default();
        params.sampling_period = -0.005;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidSamplingPeriod(_))
        ));

        let mut params = TrajectoryParams::default();
        params.omega = 120.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidLiftOffAngle(_))
        ));
    }

    #[test]
    fn setters_round_trip_and_release() {
        let mut holder = Holder::new();
        holder.initialize_internal_state().unwrap();

        holder.set_sampling_period(0.01);
        holder.set_single_support_time(0.8);
        holder.set_double_support_time(0.2);
        holder.set_omega(15.0);

        assert_relative_eq!(holder.sampling_period(), 0.01);
        assert_relative_eq!(holder.single_support_time(), 0.8);
        assert_relative_eq!(holder.double_support_time(), 0.2);
        assert_relative_eq!(holder.omega(), 15.0);
        assert_eq!(holder.releases, 4);
        assert!(!holder.initialized);
    }

    #[test]
    fn initialize_reports_invalid_params() {
        let mut holder = Holder::new();
        holder.set_single_support_time(0.0);
        let err = holder.initialize_internal_state().unwrap_err();
        assert!(matches!(err, TrajectoryError::Config(_)));
    }

    #[test]
    fn hold_double_support_copies_previous_pose() {
        let holder = Holder::new();
        let mut moving = FootPoseSample::standing(0.3, 0.1, 0.02, 5.0);
        moving.dx = 0.4;
        let mut support = vec![FootPoseSample::standing(0.0, -0.1, 0.0, 0.0); 3];
        let mut swing = vec![moving; 3];

        holder
            .hold_double_support(&mut support, &mut swing, 2, StepType::PreObstacle)
            .unwrap();
        assert!(swing[2].is_at_rest());
        assert_relative_eq!(swing[2].x, 0.3);
        assert_relative_eq!(swing[2].time, 0.01, epsilon = 1e-12);
        assert_eq!(swing[2].step_type.raw(), 12);
        assert_eq!(support[2].step_type, StepTag::DoubleSupport(StepType::PreObstacle));

        holder
            .hold_double_support(&mut support, &mut swing, 0, StepType::Normal)
            .unwrap();
        assert!(swing[0].is_at_rest());
        assert_eq!(swing[0].step_type.raw(), 11);
    }

    #[test]
    fn out_of_range_hold_writes_nothing() {
        let holder = Holder::new();
        let mut support = vec![FootPoseSample::standing(0.0, -0.1, 0.0, 0.0); 4];
        let mut swing = vec![FootPoseSample::standing(0.0, 0.1, 0.0, 0.0); 2];
        let before = support.clone();

        let err = holder
            .hold_double_support(&mut support, &mut swing, 3, StepType::Normal)
            .unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::IndexOutOfRange { index: 3, len: 2 }
        ));
        assert_eq!(support, before);
    }

    #[test]
    fn segment_lands_relative_to_support() {
        let support = FootPoseSample::standing(1.0, -0.095, 0.0, 0.0);
        let start = FootPoseSample::standing(0.8, 0.095, 0.0, 0.0);
        let step = StepSpec::new(0.2, 0.19, 10.0, 0.7, 0.1);
        let seg = SwingSegment::new(Foot::Left, &support, &start, &step);
        assert_relative_eq!(seg.landing.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(seg.landing.y, 0.095, epsilon = 1e-12);
        assert_relative_eq!(seg.landing.theta, 10.0);
        assert!(seg.landing.is_at_rest());
    }

    #[test]
    fn modulated_time_must_be_positive() {
        assert!(ensure_modulated_time(0.7).is_ok());
        assert!(ensure_modulated_time(0.0).is_err());
        assert!(ensure_modulated_time(f64::NAN).is_err());
    }
}
