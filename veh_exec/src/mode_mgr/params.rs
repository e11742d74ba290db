//! Parameters structure for the mode manager

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mode manager and the fault degradation planner.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- FALLBACK PATH ----

    /// Lateral distance by which the fallback path is shifted towards the
    /// right shoulder.
    ///
    /// Units: meters
    pub fallback_shift_m: f64,

    // ---- BRAKING PROFILE ----

    /// Speed reduction applied on each cycle while braking.
    ///
    /// Units: meters/second
    pub braking_step_ms: f64,

    /// Floor the braking profile holds until the stop timeout expires.
    ///
    /// Units: meters/second
    pub braking_floor_ms: f64,

    /// Time after fault onset at which the vehicle is forced to a stop.
    ///
    /// Units: seconds
    pub stop_timeout_s: f64,

    // ---- MANUAL MODE ----

    /// Steering command produced by a full manual demand of +/-1.
    ///
    /// Units: radians
    pub manual_steer_rate_rads: f64,
}
