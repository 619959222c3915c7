//! Deterministic RNG utilities for reproducible tests.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stride_core::{StepSpec, StepType, TrajectoryConfig};

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

const STEP_TYPES: [StepType; 5] = [
    StepType::Normal,
    StepType::PreObstacle,
    StepType::FirstLegOverObstacle,
    StepType::SecondLegOverObstacle,
    StepType::PostObstacle,
];

/// Generate a deterministic plan of `n` valid steps.
///
/// Phase durations are whole multiples of the configured sampling period
/// (single support 0.5–0.9 s scale, double support possibly zero), lateral
/// offsets alternate sign starting with a left swing from a right support.
#[allow(clippy::cast_precision_loss)]
pub fn random_plan(seed: u64, n: usize, config: &TrajectoryConfig) -> Vec<StepSpec> {
    let mut rng = seeded_rng(seed);
    let period = config.sampling_period;
    (0..n)
        .map(|i| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            let ss_samples: u32 = rng.gen_range(100..=180);
            let ds_samples: u32 = rng.gen_range(0..=30);
            StepSpec::new(
                rng.gen_range(-0.05..0.25),
                side * rng.gen_range(0.17..0.21),
                rng.gen_range(-15.0..15.0),
                f64::from(ss_samples) * period,
                f64::from(ds_samples) * period,
            )
            .with_step_type(STEP_TYPES[rng.gen_range(0..STEP_TYPES.len())])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
