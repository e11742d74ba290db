//! # Driver command processor module
//!
//! The command processor handles driver console commands coming from any
//! source and routes them into the modules.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::data_store::DataStore;
use crate::drv_cmd::DrvCmd;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a driver command.
///
/// Mutates the datastore to send commands to different modules. Mode and
/// fault events are handed to the mode manager, steering demands are latched
/// in the data store for the next cycle.
pub fn exec(ds: &mut DataStore, cmd: &DrvCmd) {
    match cmd {
        DrvCmd::ManualSteer { demand } => {
            ds.manual_steer_demand = clamp(demand, &-1.0, &1.0);
            debug!(
                "Manual steering demand set to {:.2}",
                ds.manual_steer_demand
            );
        }

        _ => {
            let event = ds.mode_mgr.handle_cmd(
                cmd,
                ds.sim_time_s,
                &ds.nominal_path,
                ds.veh_model.history(),
            );

            if let Some(event) = event {
                ds.fault_events.push(event);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
