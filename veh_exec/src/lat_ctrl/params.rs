//! Parameters structure for lateral control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lateral control.
///
/// There are deliberately no defaults here - control gains are safety
/// relevant and must come from the parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LAW SELECTION ----

    /// Which steering law to use.
    pub controller: ControllerType,

    // ---- PROPORTIONAL ----

    /// Proportional gain (k_p) applied to the heading error.
    pub proportional_gain: f64,

    // ---- PURE PURSUIT ----

    /// Lookahead gain (Kdd) scaling the lookahead distance with speed.
    pub lookahead_gain: f64,

    /// Minimum lookahead distance, guaranteeing a nonzero lookahead at zero
    /// speed.
    ///
    /// Units: meters
    pub min_lookahead_distance_m: f64,

    /// Maximum magnitude of the pure pursuit steering command.
    ///
    /// Units: degrees
    pub max_steering_angle_deg: f64,

    /// Wheelbase (L) of the vehicle.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    // ---- SPEED ----

    /// Speed requested while tracking nominally.
    ///
    /// Units: meters/second
    pub default_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Selectable steering laws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ControllerType {
    Proportional,
    PurePursuit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// The maximum steering angle converted to radians.
    pub fn max_steering_angle_rad(&self) -> f64 {
        self.max_steering_angle_deg.to_radians()
    }
}
