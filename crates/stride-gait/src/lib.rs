// stride-gait: Support-phase state machine driving when swing trajectories
// must be synthesized.

pub mod support;

pub use support::{SupportState, SupportStateMachine, WalkStart};
