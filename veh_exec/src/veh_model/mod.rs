//! # Vehicle model module
//!
//! The vehicle model integrates the commanded steering and speed into a new
//! pose once per cycle, using a forward Euler step of the point-mass
//! kinematics. The steering command is treated directly as a yaw rate, not an
//! Ackermann wheel angle - the same simplification the controllers are tuned
//! against, so it must not be "improved" in isolation.
//!
//! No saturation or bounds are applied at this layer; all limits are enforced
//! upstream by the controllers.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during vehicle model operation.
#[derive(Debug, thiserror::Error)]
pub enum VehModelError {
    #[error("The pose history window must hold at least two poses, got {0}")]
    HistoryWindowTooSmall(usize),

    #[error("No pose in the history, has the model been initialised?")]
    NoPose,
}
