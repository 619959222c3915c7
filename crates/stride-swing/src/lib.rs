// stride-swing: Swing foot trajectory generator contract, a minimum-jerk
// reference strategy and a whole-walk driver.

pub mod generator;
pub mod min_jerk;
pub mod walk;

pub use generator::{
    FootTrajectoryGenerator, SwingPlanner, SwingSegment, TrajectoryParams, ensure_index,
    ensure_modulated_time,
};
pub use min_jerk::{DEFAULT_STEP_HEIGHT, MinJerkFootTrajectory};
pub use walk::{PhaseTransition, Stance, Walk, WalkGenerator, is_double_support};
