//! # Lateral control module
//!
//! Lateral control is responsible for keeping the vehicle on the target
//! path. Two steering laws are provided behind a common interface:
//!
//! - `Proportional` - a heading servo: steer proportionally to the error
//!   between the bearing to the next path point and the vehicle's estimated
//!   heading. Used as a simple baseline for comparison and testing.
//! - `PurePursuit` - the geometric law used in ground-vehicle autopilots:
//!   chase a point on the path a speed-scaled lookahead distance ahead, and
//!   saturate the result at the configured maximum steering angle.
//!
//! Both laws share the same first step: take the latest position from the
//! pose history, estimate the heading from the last two positions, and find
//! the closest path point by linear scan. A controller asked to steer with an
//! empty path or fewer than two poses returns a neutral command rather than
//! an error.
//!
//! The law in use is selected by the `controller` parameter at startup.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod proportional;
mod pure_pursuit;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use proportional::Proportional;
pub use pure_pursuit::PurePursuit;
pub use state::*;

use crate::path::Path;
use crate::veh_model::PoseHistory;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A lateral steering law.
///
/// Implementations map the recent pose history and a path onto a steering
/// command. They must fail soft: an empty path or a history with fewer than
/// two poses produces the neutral (all zero) output.
pub trait SteeringLaw {
    /// Compute the steering command for the current cycle.
    fn compute_steering(
        &self,
        history: &PoseHistory,
        path: &Path,
        speed_ms: f64,
        params: &Params,
    ) -> SteeringOutput;

    /// Human readable name of the law, for logs and telemetry.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during lateral control initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LatCtrlError {
    #[error("Lateral control parameter `{0}` must be positive, got {1}")]
    NonPositiveParam(&'static str, f64),

    #[error("Lateral control parameter `{0}` must not be negative, got {1}")]
    NegativeParam(&'static str, f64),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Construct the steering law selected by the given controller type.
pub fn make_law(controller: ControllerType) -> Box<dyn SteeringLaw> {
    match controller {
        ControllerType::Proportional => Box::new(Proportional),
        ControllerType::PurePursuit => Box::new(PurePursuit),
    }
}
