//! Shared test fixtures and utilities for stride crates.
//!
//! Provides deterministic RNG and random step plans, standard robot fixtures,
//! sample-stream checks (continuity, holds, monotonicity) and tracing setup.

pub mod fixtures;
pub mod rng;
pub mod samples;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{init_test_tracing, standard_config, standard_geometry, straight_plan};
pub use rng::{random_plan, seeded_rng};
pub use samples::{finite_difference_error, is_monotone, max_jump};
