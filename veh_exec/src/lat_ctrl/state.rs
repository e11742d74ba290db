//! Implementations for the lateral control state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{make_law, LatCtrlError, Params, SteeringLaw};
use crate::path::Path;
use crate::veh_model::PoseHistory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lateral control module state.
pub struct LatCtrl {
    params: Params,

    /// The steering law selected at initialisation.
    law: Box<dyn SteeringLaw>,
}

/// Input data to lateral control.
pub struct InputData<'a> {
    /// The recent pose history of the vehicle.
    pub history: &'a PoseHistory,

    /// The path to track.
    pub path: &'a Path,

    /// The current speed, used to scale the lookahead distance.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}

/// Output of a steering law evaluation.
///
/// The default value is the neutral output used when the law cannot compute
/// a command (empty path, short history).
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct SteeringOutput {
    /// The steering command to apply.
    ///
    /// Units: radians
    pub steer_rad: f64,

    /// The raw steering demand before saturation.
    ///
    /// Units: radians
    pub steer_demand_rad: f64,

    /// The normalised heading error, in (-pi, pi].
    ///
    /// Units: radians
    pub heading_err_rad: f64,

    /// True if the command was clamped at the maximum steering angle.
    pub saturated: bool,
}

/// The quantities shared by both steering laws at the start of a cycle.
pub(crate) struct LawContext {
    /// The vehicle's current position, the latest history entry.
    pub position_m: Vector2<f64>,

    /// The heading estimated from the two most recent positions.
    pub heading_rad: f64,

    /// Index of the path point closest to the current position.
    pub closest_index: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the common first step of both steering laws.
///
/// Returns `None` when the path is empty or the history holds fewer than two
/// poses - the callers fail soft with a neutral output in that case.
pub(crate) fn law_context(history: &PoseHistory, path: &Path) -> Option<LawContext> {
    let position_m = history.latest()?.position_m;
    let heading_rad = history.heading_estimate_rad()?;
    let closest_index = path.closest_point_index(&position_m)?;

    Some(LawContext {
        position_m,
        heading_rad,
        closest_index,
    })
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LatCtrl {
    /// Initialise the lateral control module.
    ///
    /// The parameters are validated here - gains and geometry must be
    /// positive. A failed validation is a startup-fatal error, the controller
    /// is never run with undefined gains.
    pub fn init(params: Params) -> Result<Self, LatCtrlError> {
        let positive = [
            ("proportional_gain", params.proportional_gain),
            ("lookahead_gain", params.lookahead_gain),
            ("min_lookahead_distance_m", params.min_lookahead_distance_m),
            ("max_steering_angle_deg", params.max_steering_angle_deg),
            ("wheelbase_m", params.wheelbase_m),
        ];

        for &(name, value) in positive.iter() {
            if value <= 0.0 {
                return Err(LatCtrlError::NonPositiveParam(name, value));
            }
        }

        if params.default_speed_ms < 0.0 {
            return Err(LatCtrlError::NegativeParam(
                "default_speed_ms",
                params.default_speed_ms,
            ));
        }

        let law = make_law(params.controller);

        Ok(Self { params, law })
    }

    /// Perform cyclic processing of lateral control.
    ///
    /// This cannot fail: degraded inputs (empty path, short history) produce
    /// the neutral output.
    pub fn proc(&self, input_data: &InputData) -> SteeringOutput {
        self.law.compute_steering(
            input_data.history,
            input_data.path,
            input_data.speed_ms,
            &self.params,
        )
    }

    /// Get the module's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get the name of the steering law in use.
    pub fn law_name(&self) -> &'static str {
        self.law.name()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use super::super::ControllerType;

    fn test_params() -> Params {
        Params {
            controller: ControllerType::PurePursuit,
            proportional_gain: 2.0,
            lookahead_gain: 0.5,
            min_lookahead_distance_m: 1.0,
            max_steering_angle_deg: 30.0,
            wheelbase_m: 2.0,
            default_speed_ms: 2.0,
        }
    }

    #[test]
    fn test_init_rejects_bad_gains() {
        assert!(matches!(
            LatCtrl::init(Params {
                wheelbase_m: 0.0,
                ..test_params()
            }),
            Err(LatCtrlError::NonPositiveParam("wheelbase_m", _))
        ));

        assert!(matches!(
            LatCtrl::init(Params {
                default_speed_ms: -1.0,
                ..test_params()
            }),
            Err(LatCtrlError::NegativeParam("default_speed_ms", _))
        ));
    }

    #[test]
    fn test_init_selects_law() {
        let pp = LatCtrl::init(test_params()).unwrap();
        assert_eq!(pp.law_name(), "PurePursuit");

        let prop = LatCtrl::init(Params {
            controller: ControllerType::Proportional,
            ..test_params()
        })
        .unwrap();
        assert_eq!(prop.law_name(), "Proportional");
    }
}
