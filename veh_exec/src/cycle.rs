//! # Control cycle
//!
//! The per-cycle control transaction: arbitrate the mode, compute the
//! steering command, integrate the vehicle model, and snapshot telemetry.
//! Within a cycle this sequence is atomic with respect to all other logic -
//! driver commands are applied before the cycle via the command processor,
//! and the telemetry sinks read the snapshot only after the cycle returns.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::data_store::DataStore;
use crate::mode_mgr::{self, ModeMgrError};
use crate::tm::TmPacket;
use crate::veh_model::{self, VehModelError};
use util::module::State;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur during a control cycle.
///
/// These indicate internal invariant breaches, not degraded inputs - the
/// degraded cases (empty path, short history) all fail soft inside the
/// controllers.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Error in the mode manager: {0}")]
    ModeMgrError(#[from] ModeMgrError),

    #[error("Error in the vehicle model: {0}")]
    VehModelError(#[from] VehModelError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute one control cycle.
///
/// Returns the telemetry packet snapshotting the cycle.
pub fn exec_cycle(ds: &mut DataStore, dt_s: f64) -> Result<TmPacket, CycleError> {
    // ---- MODE ARBITRATION AND STEERING ----

    let step_input = mode_mgr::StepInput {
        sim_time_s: ds.sim_time_s,
        history: ds.veh_model.history(),
        nominal_path: &ds.nominal_path,
        manual_steer_demand: ds.manual_steer_demand,
    };

    let (cmd, report) = ds.mode_mgr.step(&step_input)?;

    if let Some(event) = report.fault_event {
        ds.fault_events.push(event);
    }

    // ---- VEHICLE MODEL INTEGRATION ----

    let (pose, _) = ds.veh_model.proc(&veh_model::InputData { cmd, dt_s })?;

    ds.ctrl_cmd = cmd;
    ds.mode_rpt = report;

    // ---- TELEMETRY SNAPSHOT ----

    Ok(TmPacket {
        sim_time_s: ds.sim_time_s,
        mode: report.mode,
        pos_x_m: pose.position_m[0],
        pos_y_m: pose.position_m[1],
        heading_rad: pose.heading_rad,
        speed_ms: pose.speed_ms,
        steer_rad: cmd.steer_rad,
        steer_demand_rad: report.steer_demand_rad,
        tracking_error_rad: report.tracking_error_rad,
        heading_err_rad: report.heading_err_rad,
        steering_saturated: report.steering_saturated,
        num_missed_deadlines: ds.num_missed_deadlines,
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd_processor;
    use crate::data_store::test_util::test_data_store;
    use crate::drv_cmd::DrvCmd;
    use crate::mode_mgr::Mode;

    const DT_S: f64 = 0.1;

    /// Run `n` cycles, driving the clock the way the main loop does.
    fn run_cycles(ds: &mut DataStore, n: usize) -> TmPacket {
        let mut last = None;

        for _ in 0..n {
            ds.cycle_start(DT_S);
            last = Some(exec_cycle(ds, DT_S).unwrap());
            ds.num_cycles += 1;
        }

        last.unwrap()
    }

    #[test]
    fn test_autopilot_tracks_straight_path() {
        // Vehicle aligned on a straight path: after the first cycle (which
        // fails soft, the history has a single pose) the controller holds
        // steering at zero and the vehicle advances down the path
        let mut ds = test_data_store();

        let packet = run_cycles(&mut ds, 20);

        assert_eq!(packet.mode, Mode::Autopilot);
        assert!(packet.steer_rad.abs() < 1e-9);
        assert!(packet.pos_y_m.abs() < 1e-9);
        assert!(packet.pos_x_m > 3.0);
        assert_eq!(packet.tracking_error_rad, 0.0);
    }

    #[test]
    fn test_first_cycle_fails_soft() {
        // One pose in the history: neutral steering, default speed applied
        let mut ds = test_data_store();

        let packet = run_cycles(&mut ds, 1);

        assert_eq!(packet.steer_rad, 0.0);
        assert_eq!(packet.speed_ms, 2.0);
    }

    #[test]
    fn test_fault_scenario_runs_to_stop() {
        // Fault at 2 m/s on a straight path: after the stop timeout of
        // simulated seconds the vehicle is Stopped with exact zeros
        let mut ds = test_data_store();

        // Get up to speed first
        run_cycles(&mut ds, 10);

        cmd_processor::exec(&mut ds, &DrvCmd::FaultSignal);
        assert_eq!(ds.fault_events.len(), 1);

        // 5 s of cycles at 100 ms cadence, plus a couple for the latch
        let packet = run_cycles(&mut ds, 52);

        assert_eq!(packet.mode, Mode::Stopped);
        assert_eq!(packet.speed_ms, 0.0);
        assert_eq!(packet.steer_rad, 0.0);
        assert_eq!(ds.mode_mgr.mode(), Mode::Stopped);
    }

    #[test]
    fn test_manual_then_autopilot_toggle() {
        let mut ds = test_data_store();

        run_cycles(&mut ds, 5);

        cmd_processor::exec(&mut ds, &DrvCmd::SelectManual);
        cmd_processor::exec(&mut ds, &DrvCmd::ManualSteer { demand: 1.0 });

        let packet = run_cycles(&mut ds, 1);
        assert_eq!(packet.mode, Mode::Manual);
        assert!((packet.steer_rad - 0.5).abs() < 1e-12);

        cmd_processor::exec(&mut ds, &DrvCmd::SelectAutopilot);
        let packet = run_cycles(&mut ds, 1);
        assert_eq!(packet.mode, Mode::Autopilot);
    }

    #[test]
    fn test_fault_clear_resumes_tracking() {
        let mut ds = test_data_store();

        run_cycles(&mut ds, 10);
        cmd_processor::exec(&mut ds, &DrvCmd::FaultSignal);
        run_cycles(&mut ds, 60);
        assert_eq!(ds.mode_mgr.mode(), Mode::Stopped);

        cmd_processor::exec(&mut ds, &DrvCmd::FaultClear);
        let packet = run_cycles(&mut ds, 1);

        assert_eq!(packet.mode, Mode::Autopilot);
        assert!(packet.speed_ms > 0.0);
    }
}
