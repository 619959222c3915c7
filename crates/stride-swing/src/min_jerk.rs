//! Minimum-jerk swing trajectory.
//!
//! Horizontal position and heading follow the quintic blend
//! `s(u) = 10u³ - 15u⁴ + 6u⁵`, which has zero velocity and acceleration at
//! both ends. Height adds a `64u³(1-u)³` bump peaking at `step_height`.
//!
//! The pitch `omega` is split into thirds of the swing window: it rises to the
//! lift-off angle while the foot pivots about the toe, holds while the pivot
//! blends from toe to heel, and falls back to zero pivoting about the heel.
//! The pivot moves the ankle; that offset is added along the swing heading.
//!
//! All derivatives are analytic.

use std::ops::{Add, Mul, Sub};

use stride_core::{
    ConfigError, Foot, FootGeometry, FootPoseSample, StepSpec, StepTag, StepType,
    TrajectoryConfig, TrajectoryError,
};

use crate::generator::{
    FootTrajectoryGenerator, SwingPlanner, SwingSegment, TrajectoryParams, ensure_index,
    ensure_modulated_time,
};

/// Default apex height of the swing (meters).
pub const DEFAULT_STEP_HEIGHT: f64 = 0.05;

const DEG: f64 = std::f64::consts::PI / 180.0;

// ---------------------------------------------------------------------------
// Jet
// ---------------------------------------------------------------------------

/// A value with its first and second time derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Jet {
    v: f64,
    d: f64,
    dd: f64,
}

impl Jet {
    const fn new(v: f64, d: f64, dd: f64) -> Self {
        Self { v, d, dd }
    }

    const fn constant(v: f64) -> Self {
        Self::new(v, 0.0, 0.0)
    }

    fn sin(self) -> Self {
        let (s, c) = self.v.sin_cos();
        Self::new(s, c * self.d, c * self.dd - s * self.d * self.d)
    }

    fn cos(self) -> Self {
        let (s, c) = self.v.sin_cos();
        Self::new(c, -s * self.d, -s * self.dd - c * self.d * self.d)
    }

    /// Linear interpolation `from + (to - from) * self`.
    fn lerp(self, from: f64, to: f64) -> Self {
        Jet::constant(from) + self * (to - from)
    }
}

impl Add for Jet {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.v + rhs.v, self.d + rhs.d, self.dd + rhs.dd)
    }
}

impl Sub for Jet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.v - rhs.v, self.d - rhs.d, self.dd - rhs.dd)
    }
}

impl Mul<f64> for Jet {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self::new(self.v * k, self.d * k, self.dd * k)
    }
}

impl Mul for Jet {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.v * rhs.v,
            self.d * rhs.v + self.v * rhs.d,
            self.dd * rhs.v + 2.0 * self.d * rhs.d + self.v * rhs.dd,
        )
    }
}

/// Quintic 0 → 1 blend at `u`, advancing at `rate` per second.
fn min_jerk(u: f64, rate: f64) -> Jet {
    let w = 1.0 - u;
    Jet::new(
        u * u * u * (10.0 - 15.0 * u + 6.0 * u * u),
        30.0 * u * u * w * w * rate,
        60.0 * u * w * (1.0 - 2.0 * u) * rate * rate,
    )
}

/// Unit bump `64u³(1-u)³` at `u`, advancing at `rate` per second.
fn bump(u: f64, rate: f64) -> Jet {
    let w = 1.0 - u;
    let m = 1.0 - 2.0 * u;
    Jet::new(
        64.0 * (u * w).powi(3),
        192.0 * (u * w).powi(2) * m * rate,
        384.0 * u * w * (m * m - u * w) * rate * rate,
    )
}

// ---------------------------------------------------------------------------
// Pivot offsets
// ---------------------------------------------------------------------------

/// Quantities derived from tunables and geometry.
#[derive(Debug, Clone, Copy)]
struct Derived {
    omega: f64,
    toe_lever: f64,
    heel_lever: f64,
    ankle_height: f64,
}

impl Derived {
    /// Ankle displacement `(forward, up)` when the foot pitches `phi` radians
    /// heel-up about the toe edge.
    fn toe_pivot(&self, phi: Jet) -> (Jet, Jet) {
        let one_minus_cos = Jet::constant(1.0) - phi.cos();
        let sin = phi.sin();
        (
            one_minus_cos * self.toe_lever + sin * self.ankle_height,
            sin * self.toe_lever - one_minus_cos * self.ankle_height,
        )
    }

    /// Ankle displacement `(forward, up)` when the foot pitches `phi` radians
    /// toe-up about the heel edge.
    fn heel_pivot(&self, phi: Jet) -> (Jet, Jet) {
        let one_minus_cos = Jet::constant(1.0) - phi.cos();
        let sin = phi.sin();
        (
            Jet::constant(0.0) - one_minus_cos * self.heel_lever - sin * self.ankle_height,
            sin * self.heel_lever - one_minus_cos * self.ankle_height,
        )
    }

    /// Pitch in degrees and ankle offset `(forward, up)` at `t` of a window
    /// of `duration` seconds.
    fn pitch(&self, t: f64, duration: f64) -> (Jet, Jet, Jet) {
        let third = duration / 3.0;
        let rate = 1.0 / third;

        if t <= third {
            let omega = min_jerk(t / third, rate) * self.omega;
            let (forward, up) = self.toe_pivot(omega * DEG);
            return (omega, forward, up);
        }
        if t < 2.0 * third {
            let omega = Jet::constant(self.omega);
            let phi = omega * DEG;
            let (toe_fwd, toe_up) = self.toe_pivot(phi);
            let (heel_fwd, heel_up) = self.heel_pivot(phi);
            let blend = min_jerk((t - third) / third, rate);
            return (
                omega,
                toe_fwd + blend * (heel_fwd - toe_fwd),
                toe_up + blend * (heel_up - toe_up),
            );
        }
        let omega = (Jet::constant(1.0) - min_jerk((t - 2.0 * third) / third, rate)) * self.omega;
        let (forward, up) = self.heel_pivot(omega * DEG);
        (omega, forward, up)
    }
}

// ---------------------------------------------------------------------------
// MinJerkFootTrajectory
// ---------------------------------------------------------------------------

/// Reference swing strategy built from minimum-jerk blends.
///
/// # Example
///
/// ```
/// use stride_core::{Foot, FootPoseSample, StepSpec, StepType};
/// use stride_swing::{
///     FootTrajectoryGenerator, MinJerkFootTrajectory, SwingPlanner, TrajectoryParams,
/// };
/// # use stride_core::FootGeometry;
/// # let geometry = FootGeometry::new(nalgebra::Vector3::new(0.0, 0.0, 0.1), 0.1, 0.2).unwrap();
///
/// let mut traj = MinJerkFootTrajectory::new(&geometry, TrajectoryParams::default());
/// traj.initialize_internal_state().unwrap();
///
/// let support = FootPoseSample::standing(0.0, -0.095, 0.0, 0.0);
/// let start = FootPoseSample::standing(0.0, 0.095, 0.0, 0.0);
/// traj.plan_swing(Foot::Left, &support, &start, &StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.1));
///
/// let mut right = vec![support; 141];
/// let mut left = vec![start; 141];
/// traj.update_foot_position(&mut right, &mut left, 140, 0, 0.7, StepType::Normal, Foot::Left)
///     .unwrap();
/// assert!((left[140].x - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct MinJerkFootTrajectory<'a> {
    geometry: &'a FootGeometry,
    params: TrajectoryParams,
    step_height: f64,
    segment: Option<SwingSegment>,
    derived: Option<Derived>,
}

impl<'a> MinJerkFootTrajectory<'a> {
    pub fn new(geometry: &'a FootGeometry, params: TrajectoryParams) -> Self {
        Self {
            geometry,
            params,
            step_height: DEFAULT_STEP_HEIGHT,
            segment: None,
            derived: None,
        }
    }

    /// Strategy with tunables taken from `config`.
    pub fn from_config(geometry: &'a FootGeometry, config: &TrajectoryConfig) -> Self {
        Self::new(geometry, TrajectoryParams::from(config))
    }

    #[must_use]
    pub fn with_step_height(mut self, step_height: f64) -> Self {
        self.set_step_height(step_height);
        self
    }

    /// Apex height of the swing above the straight start-to-landing path.
    pub const fn step_height(&self) -> f64 {
        self.step_height
    }

    pub fn set_step_height(&mut self, step_height: f64) {
        self.step_height = step_height;
        self.release_internal_state();
    }

    pub const fn is_initialized(&self) -> bool {
        self.derived.is_some()
    }

    /// Forget the planned swing.
    pub fn clear_swing(&mut self) {
        self.segment = None;
    }

    /// Swing pose at local time `t` of a window of `duration` seconds.
    fn evaluate(
        &self,
        derived: &Derived,
        segment: &SwingSegment,
        t: f64,
        duration: f64,
    ) -> FootPoseSample {
        if t >= duration {
            return segment.landing;
        }
        let t = t.max(0.0);
        let rate = 1.0 / duration;
        let s = min_jerk(t / duration, rate);
        let (start, landing) = (&segment.start, &segment.landing);

        let theta = s.lerp(start.theta, landing.theta);
        let yaw = theta * DEG;
        let (omega, forward, up) = derived.pitch(t, duration);

        let x = s.lerp(start.x, landing.x) + forward * yaw.cos();
        let y = s.lerp(start.y, landing.y) + forward * yaw.sin();
        let z = s.lerp(start.z, landing.z) + bump(t / duration, rate) * self.step_height + up;

        let mut sample = FootPoseSample::standing(x.v, y.v, z.v, theta.v);
        sample.omega = omega.v;
        sample.dx = x.d;
        sample.dy = y.d;
        sample.dz = z.d;
        sample.dtheta = theta.d;
        sample.domega = omega.d;
        sample.ddx = x.dd;
        sample.ddy = y.dd;
        sample.ddz = z.dd;
        sample.ddtheta = theta.dd;
        sample.ddomega = omega.dd;
        sample
    }

    /// Checks every precondition, then writes both samples at `index`.
    #[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
    fn write(
        &self,
        support: &mut [FootPoseSample],
        swing: &mut [FootPoseSample],
        index: usize,
        local_time: f64,
        modulated_single_support_time: f64,
        step_type: StepType,
        side: Foot,
    ) -> Result<(), TrajectoryError> {
        let derived = self.derived.as_ref().ok_or(TrajectoryError::NotInitialized)?;
        let segment = self.segment.as_ref().ok_or(TrajectoryError::NoSwingPlanned)?;
        if segment.side != side {
            return Err(TrajectoryError::SideMismatch {
                planned: segment.side,
                requested: side,
            });
        }
        ensure_modulated_time(modulated_single_support_time)?;
        ensure_index(support, index)?;
        ensure_index(swing, index)?;

        let time = index as f64 * self.params.sampling_period;
        let mut swing_sample =
            self.evaluate(derived, segment, local_time, modulated_single_support_time);
        swing_sample.time = time;
        swing_sample.step_type = StepTag::Swing(step_type);

        support[index] = segment.support.hold(time, StepTag::Support);
        swing[index] = swing_sample;
        Ok(())
    }
}

impl FootTrajectoryGenerator for MinJerkFootTrajectory<'_> {
    fn params(&self) -> &TrajectoryParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut TrajectoryParams {
        &mut self.params
    }

    fn foot_geometry(&self) -> &FootGeometry {
        self.geometry
    }

    fn initialize_internal_state(&mut self) -> Result<(), TrajectoryError> {
        self.params.validate()?;
        if !(self.step_height.is_finite() && self.step_height >= 0.0) {
            return Err(ConfigError::InvalidStepHeight(self.step_height).into());
        }
        self.derived = Some(Derived {
            omega: self.params.omega,
            toe_lever: self.geometry.toe_lever(),
            heel_lever: self.geometry.heel_lever(),
            ankle_height: self.geometry.ankle_height(),
        });
        Ok(())
    }

    fn release_internal_state(&mut self) {
        self.derived = None;
    }

    #[allow(clippy::cast_precision_loss)]
    fn update_foot_position(
        &self,
        support: &mut [FootPoseSample],
        swing: &mut [FootPoseSample],
        current_index: usize,
        index_initial: usize,
        modulated_single_support_time: f64,
        step_type: StepType,
        side: Foot,
    ) -> Result<(), TrajectoryError> {
        if current_index < index_initial {
            return Err(TrajectoryError::WindowStartAfterIndex {
                current: current_index,
                initial: index_initial,
            });
        }
        let local_time = (current_index - index_initial) as f64 * self.params.sampling_period;
        self.write(
            support,
            swing,
            current_index,
            local_time,
            modulated_single_support_time,
            step_type,
            side,
        )
    }

    #[allow(clippy::cast_precision_loss)]
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
    ) -> Result<(), TrajectoryError> {
        let index = start_index
            .checked_add(k)
            .ok_or(TrajectoryError::IndexOutOfRange {
                index: usize::MAX,
                len: swing.len(),
            })?;
        let local_time =
            local_interpolation_start_time + k as f64 * self.params.sampling_period;
        self.write(
            support,
            swing,
            index,
            local_time,
            modulated_single_support_time,
            step_type,
            side,
        )
    }
}

impl SwingPlanner for MinJerkFootTrajectory<'_> {
    fn plan_swing(
        &mut self,
        side: Foot,
        support: &FootPoseSample,
        swing_start: &FootPoseSample,
        step: &StepSpec,
    ) {
        let segment = SwingSegment::new(side, support, swing_start, step);
        tracing::debug!(
            side = %side,
            from_x = swing_start.x,
            from_y = swing_start.y,
            to_x = segment.landing.x,
            to_y = segment.landing.y,
            to_theta = segment.landing.theta,
            "swing planned"
        );
        self.segment = Some(segment);
    }

    fn planned_swing(&self) -> Option<&SwingSegment> {
        self.segment.as_ref()
    }
}

impl Drop for MinJerkFootTrajectory<'_> {
    fn drop(&mut self) {
        self.release_internal_state();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
