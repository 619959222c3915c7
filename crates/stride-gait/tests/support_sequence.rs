//! Integration test: walk the support state machine over whole plans.
//!
//! Checks, for straight and randomized plans, that:
//! 1. Phases last exactly `round(duration / period)` samples
//! 2. `state_changed` is set on exactly one tick per transition
//! 3. `nb_steps_left` never increases and ends at zero
//! 4. Step counters stay consistent with the plan length
//! 5. Support poses chain through `StepSpec::landing_pose`

use approx::assert_relative_eq;
use stride_core::{Foot, Phase, SampleClock, StepSpec};
use stride_gait::{SupportStateMachine, WalkStart};
use stride_test_utils::{init_test_tracing, random_plan, standard_config, straight_plan};

fn run(plan: Vec<StepSpec>) -> (SupportStateMachine, Vec<usize>) {
    let cfg = standard_config();
    let mut sm = SupportStateMachine::from_config(plan, &cfg, WalkStart::default()).unwrap();
    let total = sm.plan_samples();
    let mut changes = Vec::new();
    let mut last_left = sm.state().nb_steps_left;

    for _ in 0..total + 50 {
        let changed = sm.advance();
        let st = sm.state();
        assert_eq!(changed, st.state_changed);
        assert!(st.nb_steps_left <= last_left);
        assert_eq!(st.step_number + st.nb_steps_left, sm.plan().len());
        last_left = st.nb_steps_left;
        if changed {
            changes.push(sm.tick());
        }
    }
    (sm, changes)
}

#[test]
fn ten_straight_steps_keep_exact_timing() {
    init_test_tracing();
    let cfg = standard_config();
    let (sm, changes) = run(straight_plan(10, 0.2, &cfg));

    assert_eq!(sm.plan_samples(), 1600);
    assert!(sm.is_finished());
    assert_eq!(sm.state().nb_steps_left, 0);
    assert_eq!(sm.state().step_number, 10);

    // Two transitions per step: DS->SS after 20 ticks, SS->DS after 140 more.
    assert_eq!(changes.len(), 20);
    for (step, pair) in changes.chunks(2).enumerate() {
        assert_eq!(pair[0], step * 160 + 20);
        assert_eq!(pair[1], step * 160 + 160);
    }
    assert_eq!(*changes.last().unwrap(), 1600);
    assert_relative_eq!(sm.state().start_time, 8.0, epsilon = 1e-12);
}

#[test]
fn state_changed_is_a_single_tick_pulse() {
    let cfg = standard_config();
    let mut sm =
        SupportStateMachine::from_config(straight_plan(3, 0.2, &cfg), &cfg, WalkStart::default())
            .unwrap();
    let mut previous = false;
    for _ in 0..sm.plan_samples() {
        let changed = sm.advance();
        assert!(!(changed && previous), "two consecutive change ticks");
        previous = changed;
    }
}

#[test]
fn feet_alternate_and_poses_chain() {
    let cfg = standard_config();
    let plan = straight_plan(4, 0.25, &cfg);
    let mut sm =
        SupportStateMachine::from_config(plan.clone(), &cfg, WalkStart::default()).unwrap();

    let start = WalkStart::default();
    let mut expected = (start.x, start.y, start.yaw);
    let mut expected_foot = start.support_foot;

    for _ in 0..sm.plan_samples() {
        if !sm.advance() || sm.state().phase != Phase::DoubleSupport {
            continue;
        }
        let step = plan[sm.state().step_number - 1];
        expected = step.landing_pose(expected.0, expected.1, expected.2);
        expected_foot = expected_foot.other();

        let st = sm.state();
        assert_eq!(st.foot, expected_foot);
        assert_relative_eq!(st.x, expected.0, epsilon = 1e-12);
        assert_relative_eq!(st.y, expected.1, epsilon = 1e-12);
        assert_relative_eq!(st.yaw, expected.2, epsilon = 1e-12);
    }
    assert_relative_eq!(sm.state().x, 1.0, epsilon = 1e-12);
    assert_eq!(sm.state().foot, Foot::Right);
}

#[test]
fn random_plans_end_settled() {
    let cfg = standard_config();
    let clock = SampleClock::from_config(&cfg).unwrap();
    for seed in 0..8 {
        let plan = random_plan(seed, 12, &cfg);
        let expected_samples: usize = plan
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let dwell = clock.samples_for(s.ds_time);
                let dwell = if i == 0 { dwell.max(1) } else { dwell };
                dwell + clock.samples_for(s.ss_time)
            })
            .sum();

        let (sm, changes) = run(plan);
        assert_eq!(sm.plan_samples(), expected_samples, "seed {seed}");
        assert!(sm.is_finished(), "seed {seed}");
        assert_eq!(*changes.last().unwrap(), expected_samples, "seed {seed}");
        assert!(sm.state().time_limit.is_infinite());
    }
}

#[test]
fn single_support_windows_match_step_durations() {
    let cfg = standard_config();
    let clock = SampleClock::from_config(&cfg).unwrap();
    let plan = random_plan(7, 6, &cfg);
    let mut sm =
        SupportStateMachine::from_config(plan.clone(), &cfg, WalkStart::default()).unwrap();

    let mut ss_start = None;
    for _ in 0..sm.plan_samples() {
        if !sm.advance() {
            continue;
        }
        let st = *sm.state();
        if let Some((tick, step)) = ss_start.take() {
            let step: StepSpec = plan[step];
            assert_eq!(sm.tick() - tick, clock.samples_for(step.ss_time));
        }
        if st.phase == Phase::SingleSupport {
            ss_start = Some((sm.tick(), st.step_number));
            assert_relative_eq!(
                st.time_limit,
                clock.duration_of(clock.samples_for(plan[st.step_number].ss_time)),
                epsilon = 1e-12
            );
        }
    }
}
