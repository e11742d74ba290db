//! # Driver console commands
//!
//! This module defines the wire format of the events raised by the driver's
//! console (buttons, keys) or replayed from a command script. The console
//! itself is an external collaborator - the executable only consumes these
//! commands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command raised by the driver's console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrvCmd {
    /// Select autopilot driving. Deselects manual driving. Ignored while a
    /// fault is active.
    SelectAutopilot,

    /// Select manual driving. Deselects autopilot. Ignored while a fault is
    /// active.
    SelectManual,

    /// Set the manual steering demand.
    ///
    /// The demand is a dimensionless value in [-1, +1], scaled by the mode
    /// manager's `manual_steer_rate_rads` parameter. Steering follows the
    /// yaw sign convention: +1 is full left (positive yaw rate), -1 full
    /// right, 0 neutral. The demand persists until changed and is only read
    /// while in Manual mode.
    ManualSteer {
        demand: f64,
    },

    /// Signal an ECU fault, engaging the safe stop from any mode.
    FaultSignal,

    /// Clear the active fault, resuming autopilot.
    FaultClear,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let cmds = vec![
            DrvCmd::SelectAutopilot,
            DrvCmd::SelectManual,
            DrvCmd::ManualSteer { demand: -1.0 },
            DrvCmd::FaultSignal,
            DrvCmd::FaultClear,
        ];

        for cmd in cmds {
            let json = serde_json::to_string(&cmd).unwrap();
            let parsed: DrvCmd = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, cmd);
        }
    }

    #[test]
    fn test_script_payload_format() {
        // The JSON shapes used in command scripts
        let parsed: DrvCmd = serde_json::from_str("\"FaultSignal\"").unwrap();
        assert_eq!(parsed, DrvCmd::FaultSignal);

        let parsed: DrvCmd =
            serde_json::from_str("{\"ManualSteer\": {\"demand\": 0.5}}").unwrap();
        assert_eq!(parsed, DrvCmd::ManualSteer { demand: 0.5 });
    }
}
