//! # Data Store
//!
//! The data store owns all module state for the executable's lifetime. It is
//! created once at startup, after all parameters have loaded, and mutated
//! only by the cyclic executive - the telemetry layer reads a snapshot after
//! each cycle completes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::mode_mgr::{self, FaultEvent, ModeMgr};
use crate::path::Path;
use crate::veh_model::{ControlCmd, VehModel};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Simulation elapsed time, advanced by one nominal cycle period per
    /// cycle regardless of wall clock jitter
    pub sim_time_s: f64,

    // Path
    /// The nominal path supplied by the path provider at startup. Never
    /// mutated; the fallback path is derived from it on fault.
    pub nominal_path: Path,

    // Modules
    /// Vehicle model, owns the pose history
    pub veh_model: VehModel,

    /// Mode manager, owns the mode state machine and the lateral controller
    pub mode_mgr: ModeMgr,

    // Driver inputs
    /// Latched manual steering demand in [-1, +1]
    pub manual_steer_demand: f64,

    // Cycle outputs
    /// The control command applied on the last cycle
    pub ctrl_cmd: ControlCmd,

    /// The mode manager's report from the last cycle
    pub mode_rpt: mode_mgr::StatusReport,

    /// Fault episode events produced this cycle, drained by the telemetry
    /// layer
    pub fault_events: Vec<FaultEvent>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of missed cycle deadlines
    pub num_missed_deadlines: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create the data store from the initialised modules.
    pub fn new(nominal_path: Path, veh_model: VehModel, mode_mgr: ModeMgr) -> Self {
        Self {
            num_cycles: 0,
            sim_time_s: 0.0,
            nominal_path,
            veh_model,
            mode_mgr,
            manual_steer_demand: 0.0,
            ctrl_cmd: ControlCmd::default(),
            mode_rpt: mode_mgr::StatusReport::default(),
            fault_events: Vec::new(),
            num_consec_cycle_overruns: 0,
            num_missed_deadlines: 0,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Advances the simulation clock and clears those items that need
    /// clearing at the start of a cycle.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;

        self.ctrl_cmd = ControlCmd::default();
        self.mode_rpt = mode_mgr::StatusReport::default();
        self.fault_events.clear();
    }
}

// ---------------------------------------------------------------------------
// TEST UTILITIES
// ---------------------------------------------------------------------------
