//! # Telemetry module
//!
//! Defines the packet emitted once per cycle and the CSV sinks it is written
//! to. The display layer is an external collaborator: it only ever reads the
//! session files produced here, after the cycle's state mutation is
//! complete.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use crate::mode_mgr::{FaultEvent, Mode};
use util::archive::Archiver;
use util::session::Session;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry packet snapshotting one control cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TmPacket {
    pub sim_time_s: f64,

    /// The active driving mode
    pub mode: Mode,

    // Pose
    pub pos_x_m: f64,
    pub pos_y_m: f64,
    pub heading_rad: f64,

    /// Speed applied this cycle
    pub speed_ms: f64,

    /// Steering actually applied this cycle
    pub steer_rad: f64,

    /// Raw steering demand before saturation or pinning
    pub steer_demand_rad: f64,

    /// |demand - applied| for this cycle
    pub tracking_error_rad: f64,

    /// Heading error reported by the lateral controller
    pub heading_err_rad: f64,

    /// True if the steering command saturated
    pub steering_saturated: bool,

    /// Total number of missed cycle deadlines so far
    pub num_missed_deadlines: u64,
}

/// A fault event with the wall clock time attached, as written to the
/// append-only fault log.
#[derive(Debug, Clone, Serialize)]
struct FaultEventRecord {
    pub time_s: f64,
    pub utc: String,
    pub event: String,
    pub pos_x_m: f64,
    pub pos_y_m: f64,
}

/// The session CSV sinks for telemetry.
pub struct TmSink {
    tm_arch: Archiver,
    fault_arch: Archiver,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmSinkError {
    #[error("Could not create the telemetry archives: {0}")]
    ArchInitError(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmSink {
    /// Create the telemetry sinks inside the session's archive directory.
    pub fn init(session: &Session) -> Result<Self, TmSinkError> {
        let tm_arch = Archiver::from_path(session, "tm.csv")
            .map_err(|e| TmSinkError::ArchInitError(e.to_string()))?;

        let fault_arch = Archiver::from_path(session, "fault_events.csv")
            .map_err(|e| TmSinkError::ArchInitError(e.to_string()))?;

        Ok(Self { tm_arch, fault_arch })
    }

    /// Write one cycle's telemetry packet.
    ///
    /// Telemetry is best effort: a write failure is logged and execution
    /// continues.
    pub fn write(&mut self, packet: &TmPacket) {
        if let Err(e) = self.tm_arch.serialise(packet) {
            warn!("Could not write telemetry packet: {}", e);
        }
    }

    /// Append an event to the fault log.
    pub fn write_fault_event(&mut self, event: &FaultEvent) {
        let record = FaultEventRecord {
            time_s: event.time_s,
            utc: chrono::Utc::now().to_rfc3339(),
            event: format!("{:?}", event.kind),
            pos_x_m: event.pos_x_m,
            pos_y_m: event.pos_y_m,
        };

        if let Err(e) = self.fault_arch.serialise(&record) {
            warn!("Could not write fault event: {}", e);
        }
    }
}
