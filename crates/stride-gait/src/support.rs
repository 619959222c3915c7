//! Support-phase state machine.
//!
//! Walks a plan of [`StepSpec`]s one control tick at a time. Each step is a
//! double support dwell followed by a single support swing; after the last
//! swing the machine settles in a terminal double support stance.
//!
//! Phase lengths are counted in whole samples (see [`SampleClock`]), so the
//! tick on which a phase flips is exact for any plan length.

use std::fmt;

use serde::{Deserialize, Serialize};
use stride_core::{
    Foot, Phase, PlanError, SampleClock, StepSpec, StrideError, TrajectoryConfig,
};

// ---------------------------------------------------------------------------
// SupportState
// ---------------------------------------------------------------------------

/// Support state of the robot at one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportState {
    /// Active support phase.
    pub phase: Phase,
    /// Foot bearing weight in the current (or upcoming) single support.
    pub foot: Foot,
    /// Steps left before the final double support stance.
    pub nb_steps_left: usize,
    /// Index of the step being executed.
    pub step_number: usize,
    /// Samples elapsed in this phase.
    pub nb_instants: usize,
    /// Duration of this phase in seconds; infinite once the walk settled.
    pub time_limit: f64,
    /// Time at which this phase started.
    pub start_time: f64,
    /// Support reference position on the ground plane.
    pub x: f64,
    pub y: f64,
    /// Support reference heading in degrees.
    pub yaw: f64,
    /// `true` only on the tick where the phase changed.
    pub state_changed: bool,
}

impl Default for SupportState {
    fn default() -> Self {
        Self {
            phase: Phase::DoubleSupport,
            foot: Foot::Left,
            nb_steps_left: 0,
            step_number: 0,
            nb_instants: 0,
            time_limit: 0.0,
            start_time: 0.0,
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            state_changed: false,
        }
    }
}

impl SupportState {
    /// Reset to the canonical zero state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Seconds left in this phase for a given sampling period.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_remaining(&self, sampling_period: f64) -> f64 {
        self.time_limit - self.nb_instants as f64 * sampling_period
    }
}

impl fmt::Display for SupportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SupportState")?;
        writeln!(f, "PhaseType {}", self.phase)?;
        writeln!(f, "Foot {}", self.foot)?;
        writeln!(f, "NbStepsLeft {}", self.nb_steps_left)?;
        writeln!(f, "StepNumber {}", self.step_number)?;
        writeln!(f, "NbInstants {}", self.nb_instants)?;
        writeln!(f, "TimeLimit {}", self.time_limit)?;
        writeln!(f, "StartTime {}", self.start_time)?;
        writeln!(f, "X {}", self.x)?;
        writeln!(f, "Y {}", self.y)?;
        writeln!(f, "Yaw {}", self.yaw)?;
        write!(f, "StateChanged {}", self.state_changed)
    }
}

// ---------------------------------------------------------------------------
// WalkStart
// ---------------------------------------------------------------------------

/// Initial support foot and its pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkStart {
    pub support_foot: Foot,
    pub x: f64,
    pub y: f64,
    /// Heading in degrees.
    pub yaw: f64,
}

impl WalkStart {
    pub const fn new(support_foot: Foot, x: f64, y: f64, yaw: f64) -> Self {
        Self {
            support_foot,
            x,
            y,
            yaw,
        }
    }
}

impl Default for WalkStart {
    /// Standing on the right foot at `y = -0.095`, so the first swing is left.
    fn default() -> Self {
        Self::new(Foot::Right, 0.0, -0.095, 0.0)
    }
}

// ---------------------------------------------------------------------------
// SupportStateMachine
// ---------------------------------------------------------------------------

/// Tracks the support phase over a step plan.
///
/// # Example
///
/// ```
/// use stride_core::{Phase, SampleClock, StepSpec};
/// use stride_gait::{SupportStateMachine, WalkStart};
///
/// let clock = SampleClock::new(0.005).unwrap();
/// let plan = vec![StepSpec::new(0.2, 0.19, 0.0, 0.7, 0.1)];
/// let mut sm = SupportStateMachine::new(plan, clock, WalkStart::default()).unwrap();
/// assert_eq!(sm.state().phase, Phase::DoubleSupport);
///
/// for _ in 0..20 {
///     sm.advance();
/// }
/// assert_eq!(sm.state().phase, Phase::SingleSupport);
/// assert!(sm.state().state_changed);
/// ```
#[derive(Debug, Clone)]
pub struct SupportStateMachine {
    plan: Vec<StepSpec>,
    clock: SampleClock,
    start: WalkStart,
    state: SupportState,
    tick: usize,
    /// Sample count of the active phase; `None` once settled.
    phase_samples: Option<usize>,
}

impl SupportStateMachine {
    /// Create a machine in the initial double support of `plan`.
    ///
    /// Every step is validated up front; nothing is clamped.
    pub fn new(
        plan: Vec<StepSpec>,
        clock: SampleClock,
        start: WalkStart,
    ) -> Result<Self, PlanError> {
        for (i, step) in plan.iter().enumerate() {
            step.validate(i)?;
            if clock.samples_for(step.ss_time) == 0 {
                return Err(PlanError::SingleSupportBelowPeriod {
                    step: i,
                    value: step.ss_time,
                });
            }
        }
        let mut machine = Self {
            plan,
            clock,
            start,
            state: SupportState::default(),
            tick: 0,
            phase_samples: None,
        };
        machine.reset();
        Ok(machine)
    }

    /// Create a machine clocked at the configured sampling period.
    pub fn from_config(
        plan: Vec<StepSpec>,
        config: &TrajectoryConfig,
        start: WalkStart,
    ) -> Result<Self, StrideError> {
        config.validate()?;
        let clock = SampleClock::from_config(config)?;
        Ok(Self::new(plan, clock, start)?)
    }

    /// Rewind to the initial state of the same plan.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.state = SupportState {
            phase: Phase::DoubleSupport,
            foot: self.start.support_foot,
            nb_steps_left: self.plan.len(),
            step_number: 0,
            nb_instants: 0,
            time_limit: f64::INFINITY,
            start_time: 0.0,
            x: self.start.x,
            y: self.start.y,
            yaw: self.start.yaw,
            state_changed: false,
        };
        self.phase_samples = None;
        if let Some(first) = self.plan.first() {
            let samples = self.initial_dwell_samples(first);
            self.state.time_limit = self.clock.duration_of(samples);
            self.phase_samples = Some(samples);
        }
    }

    /// Advance one control tick. Returns `true` if the phase changed.
    pub fn advance(&mut self) -> bool {
        self.tick += 1;
        self.state.nb_instants += 1;
        self.state.state_changed = false;

        let Some(limit) = self.phase_samples else {
            return false;
        };
        if self.state.nb_instants < limit {
            return false;
        }

        self.transition();
        true
    }

    fn transition(&mut self) {
        let now = self.clock.time_at(self.tick);
        match self.state.phase {
            Phase::DoubleSupport => self.enter_single_support(),
            Phase::SingleSupport => self.land(),
        }
        self.state.start_time = now;
        self.state.nb_instants = 0;
        self.state.state_changed = true;

        tracing::debug!(
            tick = self.tick,
            time = now,
            phase = %self.state.phase,
            foot = %self.state.foot,
            steps_left = self.state.nb_steps_left,
            "support phase changed"
        );
    }

    fn enter_single_support(&mut self) {
        let step = self.plan[self.state.step_number];
        let samples = self.clock.samples_for(step.ss_time);
        self.state.phase = Phase::SingleSupport;
        self.state.time_limit = self.clock.duration_of(samples);
        self.phase_samples = Some(samples);
    }

    /// Swing foot touches down: it becomes the support reference.
    fn land(&mut self) {
        let step = self.plan[self.state.step_number];
        let (x, y, yaw) = step.landing_pose(self.state.x, self.state.y, self.state.yaw);
        self.state.x = x;
        self.state.y = y;
        self.state.yaw = yaw;
        self.state.foot = self.state.foot.other();
        self.state.nb_steps_left -= 1;
        self.state.step_number += 1;

        if self.state.nb_steps_left == 0 {
            self.state.phase = Phase::DoubleSupport;
            self.state.time_limit = f64::INFINITY;
            self.phase_samples = None;
            tracing::info!(
                tick = self.tick,
                steps = self.plan.len(),
                x,
                y,
                yaw,
                "walk settled in final double support"
            );
            return;
        }

        let next = self.plan[self.state.step_number];
        let dwell = self.clock.samples_for(next.ds_time);
        if dwell == 0 {
            self.enter_single_support();
        } else {
            self.state.phase = Phase::DoubleSupport;
            self.state.time_limit = self.clock.duration_of(dwell);
            self.phase_samples = Some(dwell);
        }
    }

    /// The initial stance lasts at least one tick even with a zero dwell.
    fn initial_dwell_samples(&self, first: &StepSpec) -> usize {
        self.clock.samples_for(first.ds_time).max(1)
    }

    /// Current support state.
    #[must_use]
    pub const fn state(&self) -> &SupportState {
        &self.state
    }

    /// Step whose dwell or swing is active; `None` once settled.
    #[must_use]
    pub fn current_step(&self) -> Option<&StepSpec> {
        if self.state.nb_steps_left == 0 {
            return None;
        }
        self.plan.get(self.state.step_number)
    }

    /// Foot swinging in the current single support.
    #[must_use]
    pub const fn swing_foot(&self) -> Option<Foot> {
        match self.state.phase {
            Phase::SingleSupport => Some(self.state.foot.other()),
            Phase::DoubleSupport => None,
        }
    }

    /// `true` once the final double support stance is reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.nb_steps_left == 0 && self.state.phase == Phase::DoubleSupport
    }

    /// Ticks advanced since construction or reset.
    #[must_use]
    pub const fn tick(&self) -> usize {
        self.tick
    }

    /// Time of the current tick in seconds.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.clock.time_at(self.tick)
    }

    /// Sample clock driving the machine.
    #[must_use]
    pub const fn clock(&self) -> &SampleClock {
        &self.clock
    }

    /// The step plan.
    #[must_use]
    pub fn plan(&self) -> &[StepSpec] {
        &self.plan
    }

    /// Sample count of the active phase; `None` once settled.
    #[must_use]
    pub const fn phase_samples(&self) -> Option<usize> {
        self.phase_samples
    }

    /// Tick at which the final stance begins (the length of the walk in
    /// samples, excluding the final dwell).
    #[must_use]
    pub fn plan_samples(&self) -> usize {
        self.plan
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let dwell = if i == 0 {
                    self.initial_dwell_samples(step)
                } else {
                    self.clock.samples_for(step.ds_time)
                };
                dwell + self.clock.samples_for(step.ss_time)
            })
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
