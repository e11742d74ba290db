//! # Vehicle Executable Parameters
//!
//! This module provides parameters for the vehicle executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct VehExecParams {

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Total simulated duration to run for.
    ///
    /// Units: seconds
    pub sim_duration_s: f64,

    /// Path to the nominal path file, relative to the software root.
    pub path_file: String
}
