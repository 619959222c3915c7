//! Standard robot fixtures.

use nalgebra::Vector3;
use stride_core::{FootGeometry, StepSpec, TrajectoryConfig};

/// Default tunables: 5 ms sampling, 0.7 s single / 0.1 s double support.
pub fn standard_config() -> TrajectoryConfig {
    TrajectoryConfig::default()
}

/// HRP-2 sized foot: ankle 0.105 m above a 0.2172 x 0.138 m sole, slightly
/// behind the sole centre so toe and heel levers differ.
pub fn standard_geometry() -> FootGeometry {
    FootGeometry::new(Vector3::new(-0.01, 0.0, 0.105), 0.138, 0.2172)
        .expect("standard geometry is valid")
}

/// `n` straight normal steps of `stride` meters, alternating lateral offset
/// of 0.19 m, timed with `config`. The first step swings the left foot.
pub fn straight_plan(n: usize, stride: f64, config: &TrajectoryConfig) -> Vec<StepSpec> {
    (0..n)
        .map(|i| {
            let sy = if i % 2 == 0 { 0.19 } else { -0.19 };
            StepSpec::with_timing(stride, sy, 0.0, config)
        })
        .collect()
}

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; silently does nothing if a subscriber is already set.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
