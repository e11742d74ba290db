//! Parameters structure for the vehicle model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the vehicle model.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    // ---- INITIAL STATE ----

    /// Initial x position of the vehicle.
    ///
    /// Units: meters
    pub initial_pos_x_m: f64,

    /// Initial y position of the vehicle.
    ///
    /// Units: meters
    pub initial_pos_y_m: f64,

    /// Initial heading of the vehicle, measured from the +x axis.
    ///
    /// Units: radians
    pub initial_heading_rad: f64,

    // ---- HISTORY ----

    /// Number of poses retained in the history window.
    ///
    /// The controllers estimate the heading from the two most recent
    /// positions, so this must be at least 2.
    pub history_window: usize,
}
