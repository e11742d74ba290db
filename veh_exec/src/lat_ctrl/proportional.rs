//! # Proportional steering law
//!
//! A heading servo: the steering command is the heading error multiplied by
//! the proportional gain. The target is the path point immediately after the
//! closest one, so on a wrapping path the law follows the loop indefinitely.
//! No saturation is applied by this law.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::state::law_context;
use super::{Params, SteeringLaw, SteeringOutput};
use crate::path::Path;
use crate::veh_model::PoseHistory;
use util::maths::norm_angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The proportional steering law.
pub struct Proportional;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringLaw for Proportional {
    fn compute_steering(
        &self,
        history: &PoseHistory,
        path: &Path,
        _speed_ms: f64,
        params: &Params,
    ) -> SteeringOutput {
        let ctx = match law_context(history, path) {
            Some(c) => c,
            None => return SteeringOutput::default(),
        };

        let target_m = match path.next_point(ctx.closest_index) {
            Some(t) => t,
            None => return SteeringOutput::default(),
        };

        // Desired heading is the bearing from the current position to the
        // target point
        let to_target = target_m - ctx.position_m;
        let desired_rad = to_target[1].atan2(to_target[0]);

        let heading_err_rad = norm_angle(desired_rad - ctx.heading_rad);

        let steer_rad = params.proportional_gain * heading_err_rad;

        SteeringOutput {
            steer_rad,
            steer_demand_rad: steer_rad,
            heading_err_rad,
            saturated: false,
        }
    }

    fn name(&self) -> &'static str {
        "Proportional"
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
