//! Control command definition

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The command applied to the vehicle model on one cycle.
///
/// The default value is the neutral command: zero steering, zero speed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCmd {
    /// Steering command, treated as a yaw rate by the model.
    ///
    /// Units: radians
    pub steer_rad: f64,

    /// Requested speed. Never negative.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}
