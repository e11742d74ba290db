//! # Mode manager module
//!
//! This module implements the driving-mode state machine and selects, every
//! cycle, which source produces the control command fed to the vehicle
//! model. The modes are:
//!
//! - `Autopilot` - the lateral controller tracks the nominal path (initial
//!   mode).
//! - `Manual` - the driver's steering demand is passed through, no
//!   controller call.
//! - `Failure` - a fault is active: the lateral controller tracks the
//!   fallback path while the braking profile winds the speed down, until the
//!   stop timeout forces a full stop.
//! - `Stopped` - steering and speed are pinned to exactly zero.
//!
//! Autopilot and Manual are mutually exclusive and toggled by external
//! select events. A fault signal preempts either of them unconditionally.
//! Mode toggles are ignored while in Failure or Stopped - the driver cannot
//! override a fault condition; only an explicit fault-clear event leaves
//! those modes, returning to Autopilot.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod failure;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{error, info, warn};
use serde::Serialize;

// Internal
pub use failure::{FailureCtx, FaultEvent, FaultEventKind};
pub use params::Params;

use crate::drv_cmd::DrvCmd;
use crate::lat_ctrl::{self, LatCtrl};
use crate::path::Path;
use crate::veh_model::{ControlCmd, PoseHistory};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mode manager state.
pub struct ModeMgr {
    params: Params,

    /// The lateral controller driven while in Autopilot or Failure.
    lat_ctrl: LatCtrl,

    /// The currently active mode.
    mode: Mode,

    /// The active fault episode. `Some` exactly while in Failure or Stopped.
    failure_ctx: Option<FailureCtx>,
}

/// Input data for one step of the mode manager.
pub struct StepInput<'a> {
    /// Current simulation time.
    pub sim_time_s: f64,

    /// The recent pose history of the vehicle.
    pub history: &'a PoseHistory,

    /// The nominal path.
    pub nominal_path: &'a Path,

    /// The driver's manual steering demand in [-1, +1]. Read only while in
    /// Manual.
    pub manual_steer_demand: f64,
}

/// Status report for mode manager processing.
#[derive(Debug, Copy, Clone, Default)]
pub struct StatusReport {
    /// The mode active after this step.
    pub mode: Mode,

    /// The raw steering demand before saturation or pinning.
    ///
    /// Units: radians
    pub steer_demand_rad: f64,

    /// |demand - applied| for this cycle.
    ///
    /// Units: radians
    pub tracking_error_rad: f64,

    /// Normalised heading error reported by the lateral controller, zero
    /// when no controller ran.
    ///
    /// Units: radians
    pub heading_err_rad: f64,

    /// True if the steering command was clamped at the maximum angle.
    pub steering_saturated: bool,

    /// Fault episode event produced by this step, if any.
    pub fault_event: Option<FaultEvent>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The driving modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Mode {
    Autopilot,
    Manual,
    Failure,
    Stopped,
}

/// Errors that can occur in the mode manager.
#[derive(Debug, thiserror::Error)]
pub enum ModeMgrError {
    #[error("Mode manager parameter `{0}` must be positive, got {1}")]
    NonPositiveParam(&'static str, f64),

    #[error("In Failure mode but no failure context exists")]
    NoFailureCtx,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Mode {
    fn default() -> Self {
        Mode::Autopilot
    }
}

impl ModeMgr {
    /// Initialise the mode manager.
    ///
    /// Takes ownership of the already initialised lateral controller. The
    /// initial mode is Autopilot.
    pub fn init(params: Params, lat_ctrl: LatCtrl) -> Result<Self, ModeMgrError> {
        let positive = [
            ("fallback_shift_m", params.fallback_shift_m),
            ("braking_step_ms", params.braking_step_ms),
            ("braking_floor_ms", params.braking_floor_ms),
            ("stop_timeout_s", params.stop_timeout_s),
            ("manual_steer_rate_rads", params.manual_steer_rate_rads),
        ];

        for &(name, value) in positive.iter() {
            if value <= 0.0 {
                return Err(ModeMgrError::NonPositiveParam(name, value));
            }
        }

        Ok(Self {
            params,
            lat_ctrl,
            mode: Mode::Autopilot,
            failure_ctx: None,
        })
    }

    /// Get the currently active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Apply an external driver event.
    ///
    /// Takes effect on the next call to [`ModeMgr::step`], i.e. on the next
    /// cycle boundary. Returns the fault log event produced by the
    /// transition, if any.
    pub fn handle_cmd(
        &mut self,
        cmd: &DrvCmd,
        sim_time_s: f64,
        nominal_path: &Path,
        history: &PoseHistory,
    ) -> Option<FaultEvent> {
        match cmd {
            DrvCmd::SelectAutopilot => {
                match self.mode {
                    Mode::Autopilot => (),
                    Mode::Manual => {
                        info!("Autopilot selected");
                        self.mode = Mode::Autopilot;
                    }
                    _ => warn!("Mode toggles are ignored while in {:?}", self.mode),
                }
                None
            }

            DrvCmd::SelectManual => {
                match self.mode {
                    Mode::Manual => (),
                    Mode::Autopilot => {
                        info!("Manual mode selected");
                        self.mode = Mode::Manual;
                    }
                    _ => warn!("Mode toggles are ignored while in {:?}", self.mode),
                }
                None
            }

            // Steering demands are consumed by the command processor, not by
            // the state machine
            DrvCmd::ManualSteer { .. } => None,

            DrvCmd::FaultSignal => match self.mode {
                Mode::Failure | Mode::Stopped => {
                    warn!("Fault signalled but already in {:?}, ignored", self.mode);
                    None
                }
                _ => {
                    error!(
                        "Fault signalled at {:.2} s, engaging safe stop from {:?}",
                        sim_time_s, self.mode
                    );

                    let current_speed_ms = history.latest().map(|p| p.speed_ms).unwrap_or(0.0);

                    self.failure_ctx = Some(FailureCtx::new(
                        sim_time_s,
                        nominal_path,
                        current_speed_ms,
                        &self.params,
                    ));
                    self.mode = Mode::Failure;

                    Some(self.make_event(FaultEventKind::Onset, sim_time_s, history))
                }
            },

            DrvCmd::FaultClear => match self.mode {
                Mode::Failure | Mode::Stopped => {
                    // Resuming is not re-validated - there is no sensing in
                    // the loop to validate against. The warning keeps the
                    // assumption visible to operators.
                    warn!(
                        "Fault cleared at {:.2} s, resuming Autopilot on the nominal path \
                         without re-validation",
                        sim_time_s
                    );

                    self.failure_ctx = None;
                    self.mode = Mode::Autopilot;

                    Some(self.make_event(FaultEventKind::Cleared, sim_time_s, history))
                }
                _ => {
                    warn!("Fault clear recieved but no fault is active, ignored");
                    None
                }
            },
        }
    }

    /// Select the command source for this cycle and produce the control
    /// command.
    pub fn step(&mut self, input: &StepInput) -> Result<(ControlCmd, StatusReport), ModeMgrError> {
        let mut report = StatusReport::default();

        let cmd = match self.mode {
            Mode::Autopilot => {
                let speed_ms = self.lat_ctrl.params().default_speed_ms;
                let out = self.lat_ctrl.proc(&lat_ctrl::InputData {
                    history: input.history,
                    path: input.nominal_path,
                    speed_ms,
                });

                report.steer_demand_rad = out.steer_demand_rad;
                report.heading_err_rad = out.heading_err_rad;
                report.steering_saturated = out.saturated;

                ControlCmd {
                    steer_rad: out.steer_rad,
                    speed_ms,
                }
            }

            Mode::Manual => {
                // Passthrough: no controller call
                let steer_rad = input.manual_steer_demand * self.params.manual_steer_rate_rads;
                report.steer_demand_rad = steer_rad;

                ControlCmd {
                    steer_rad,
                    speed_ms: self.lat_ctrl.params().default_speed_ms,
                }
            }

            Mode::Failure => {
                let ctx = match self.failure_ctx {
                    Some(ref mut c) => c,
                    None => return Err(ModeMgrError::NoFailureCtx),
                };

                if ctx.elapsed_s(input.sim_time_s) >= self.params.stop_timeout_s {
                    // Timeout expired: force an exact stop and latch it
                    self.mode = Mode::Stopped;

                    let pos_m = input
                        .history
                        .latest()
                        .map(|p| p.position_m)
                        .unwrap_or_else(nalgebra::Vector2::zeros);

                    info!(
                        "Vehicle stopped in a safe zone. Final position: ({:.2}, {:.2})",
                        pos_m[0], pos_m[1]
                    );

                    report.fault_event = Some(self.make_event(
                        FaultEventKind::SafeStop,
                        input.sim_time_s,
                        input.history,
                    ));

                    ControlCmd::default()
                } else {
                    // Track the fallback path at the braking target speed
                    let speed_ms = ctx.brake_step(&self.params);
                    let out = self.lat_ctrl.proc(&lat_ctrl::InputData {
                        history: input.history,
                        path: ctx.fallback_path(),
                        speed_ms,
                    });

                    report.steer_demand_rad = out.steer_demand_rad;
                    report.heading_err_rad = out.heading_err_rad;
                    report.steering_saturated = out.saturated;

                    ControlCmd {
                        steer_rad: out.steer_rad,
                        speed_ms,
                    }
                }
            }

            Mode::Stopped => ControlCmd::default(),
        };

        report.mode = self.mode;
        report.tracking_error_rad = (report.steer_demand_rad - cmd.steer_rad).abs();

        Ok((cmd, report))
    }

    /// Build a fault log event at the vehicle's current position.
    fn make_event(
        &self,
        kind: FaultEventKind,
        sim_time_s: f64,
        history: &PoseHistory,
    ) -> FaultEvent {
        let pos_m = history
            .latest()
            .map(|p| p.position_m)
            .unwrap_or_else(nalgebra::Vector2::zeros);

        FaultEvent {
            time_s: sim_time_s,
            kind,
            pos_x_m: pos_m[0],
            pos_y_m: pos_m[1],
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
