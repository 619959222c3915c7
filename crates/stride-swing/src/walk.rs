//! Whole-walk driver.
//!
//! Ticks a [`SupportStateMachine`] over a step plan and asks a strategy for
//! both foot poses at every sample: a swing update during single support, a
//! double support hold otherwise.

use stride_core::{
    Foot, FootPoseSample, Phase, StepSpec, StepTag, StepType, StrideError, TrajectoryConfig,
};
use stride_gait::{SupportStateMachine, WalkStart};

use crate::generator::{FootTrajectoryGenerator, SwingPlanner};

/// Tolerance when comparing a requested swing duration with its window.
const WINDOW_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Stance
// ---------------------------------------------------------------------------

/// Both feet before the first step, and which one bears weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stance {
    pub support_foot: Foot,
    pub left: FootPoseSample,
    pub right: FootPoseSample,
}

impl Stance {
    pub const fn new(support_foot: Foot, left: FootPoseSample, right: FootPoseSample) -> Self {
        Self {
            support_foot,
            left,
            right,
        }
    }

    /// Feet side by side at the origin, `width` apart, standing on the right
    /// foot so the first swing is left.
    #[must_use]
    pub const fn standing(width: f64) -> Self {
        Self::new(
            Foot::Right,
            FootPoseSample::standing(0.0, 0.5 * width, 0.0, 0.0),
            FootPoseSample::standing(0.0, -0.5 * width, 0.0, 0.0),
        )
    }

    /// Pose of `foot`.
    #[must_use]
    pub const fn foot(&self, foot: Foot) -> &FootPoseSample {
        match foot {
            Foot::Left => &self.left,
            Foot::Right => &self.right,
        }
    }

    /// Initial support reference for the state machine.
    #[must_use]
    pub const fn walk_start(&self) -> WalkStart {
        let support = self.foot(self.support_foot);
        WalkStart::new(self.support_foot, support.x, support.y, support.theta)
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// A support phase change at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTransition {
    pub index: usize,
    pub time: f64,
    pub phase: Phase,
    pub support_foot: Foot,
    pub step_number: usize,
}

/// Generated samples for both feet, indexed by control tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub left: Vec<FootPoseSample>,
    pub right: Vec<FootPoseSample>,
    pub transitions: Vec<PhaseTransition>,
}

impl Walk {
    /// Number of samples per foot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Samples of `foot`.
    #[must_use]
    pub fn samples(&self, foot: Foot) -> &[FootPoseSample] {
        match foot {
            Foot::Left => &self.left,
            Foot::Right => &self.right,
        }
    }
}

// ---------------------------------------------------------------------------
// WalkGenerator
// ---------------------------------------------------------------------------

/// Drives a strategy over a whole step plan.
pub struct WalkGenerator<'g, G> {
    machine: SupportStateMachine,
    generator: &'g mut G,
    stance: Stance,
    final_dwell: usize,
}

impl<'g, G> WalkGenerator<'g, G>
where
    G: FootTrajectoryGenerator + SwingPlanner,
{
    /// Validate `config` and `plan`, and load every tunable of `config` into
    /// `generator` before initializing it.
    pub fn new(
        plan: Vec<StepSpec>,
        config: &TrajectoryConfig,
        stance: Stance,
        generator: &'g mut G,
    ) -> Result<Self, StrideError> {
        let machine = SupportStateMachine::from_config(plan, config, stance.walk_start())?;
        let final_dwell = machine.clock().samples_for(config.double_support_duration);
        generator.set_sampling_period(config.sampling_period);
        generator.set_single_support_time(config.single_support_duration);
        generator.set_double_support_time(config.double_support_duration);
        generator.set_omega(config.lift_off_angle);
        generator.initialize_internal_state()?;
        Ok(Self {
            machine,
            generator,
            stance,
            final_dwell,
        })
    }

    /// Number of samples [`generate`](Self::generate) produces per foot.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.machine.plan_samples() + self.final_dwell
    }

    /// The underlying state machine.
    #[must_use]
    pub const fn machine(&self) -> &SupportStateMachine {
        &self.machine
    }

    /// Generate the whole walk from the initial stance.
    pub fn generate(&mut self) -> Result<Walk, StrideError> {
        self.machine.reset();
        let total = self.total_samples();
        let mut left = vec![self.stance.left; total];
        let mut right = vec![self.stance.right; total];
        let mut transitions = Vec::new();

        let mut window_start = 0;
        let mut window = 0.0;

        for index in 0..total {
            if index > 0 {
                self.machine.advance();
            }
            let state = *self.machine.state();
            let (support, swing) = by_support(&mut left, &mut right, state.foot);

            if state.state_changed {
                transitions.push(PhaseTransition {
                    index,
                    time: self.machine.current_time(),
                    phase: state.phase,
                    support_foot: state.foot,
                    step_number: state.step_number,
                });
            }

            match (state.phase, self.machine.current_step().copied()) {
                (Phase::SingleSupport, Some(step)) => {
                    let side = state.foot.other();
                    if state.state_changed {
                        // The previous sample is the rest pose the swing starts from.
                        window_start = index - 1;
                        window = self.swing_duration(&step, state.time_limit, index);
                        self.generator.plan_swing(
                            side,
                            &support[window_start],
                            &swing[window_start],
                            &step,
                        );
                    }
                    self.generator.update_foot_position(
                        support,
                        swing,
                        index,
                        window_start,
                        window,
                        step.step_type,
                        side,
                    )?;
                }
                (_, current) => {
                    let step_type = current
                        .or_else(|| self.machine.plan().last().copied())
                        .map_or(StepType::Normal, |step| step.step_type);
                    self.generator
                        .hold_double_support(support, swing, index, step_type)?;
                }
            }
        }

        tracing::info!(
            samples = total,
            steps = self.machine.plan().len(),
            transitions = transitions.len(),
            "walk generated"
        );
        Ok(Walk {
            left,
            right,
            transitions,
        })
    }

    /// Swing duration for `step` inside a single support window of `window`
    /// seconds. A swing longer than its window would be cut before landing,
    /// so it is shortened to the window; one within rounding of the window
    /// snaps to it so the last tick lands exactly.
    fn swing_duration(&self, step: &StepSpec, window: f64, index: usize) -> f64 {
        if step.ss_time < window - WINDOW_EPS {
            return step.ss_time;
        }
        if step.ss_time > window + WINDOW_EPS {
            tracing::warn!(
                index,
                step = self.machine.state().step_number,
                requested = step.ss_time,
                window,
                "modulated single support time exceeds its window"
            );
        }
        window
    }
}

/// `(support, swing)` sequences for a support foot.
fn by_support<'b>(
    left: &'b mut [FootPoseSample],
    right: &'b mut [FootPoseSample],
    support_foot: Foot,
) -> (&'b mut [FootPoseSample], &'b mut [FootPoseSample]) {
    match support_foot {
        Foot::Left => (left, right),
        Foot::Right => (right, left),
    }
}

/// `true` if `sample` is a double support hold.
#[must_use]
pub const fn is_double_support(sample: &FootPoseSample) -> bool {
    matches!(sample.step_type, StepTag::DoubleSupport(_))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
