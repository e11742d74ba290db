//! # Failure context and fault degradation planning
//!
//! When a fault is signalled the mode manager creates a [`FailureCtx`]. The
//! context is built exactly once per fault episode: it synthesises the
//! fallback path (the nominal path shifted towards the right shoulder) and
//! then tracks the braking target speed cycle by cycle until the stop
//! timeout expires. It is destroyed when the fault is cleared.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::Params;
use crate::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of a single fault episode.
#[derive(Debug, Clone)]
pub struct FailureCtx {
    /// Simulation time at which the fault was signalled.
    onset_time_s: f64,

    /// The fallback path synthesised at fault onset.
    ///
    /// If the nominal path was empty or degenerate this may itself be empty,
    /// in which case the lateral controller fails soft to neutral steering.
    fallback_path: Path,

    /// The evolving target speed of the braking profile.
    target_speed_ms: f64,
}

/// An entry for the fault event log.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct FaultEvent {
    /// Simulation time of the event.
    pub time_s: f64,

    /// What happened.
    pub kind: FaultEventKind,

    /// Vehicle x position at the event.
    pub pos_x_m: f64,

    /// Vehicle y position at the event.
    pub pos_y_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kinds of event a fault episode can produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FaultEventKind {
    /// A fault was signalled and the safe stop engaged.
    Onset,

    /// The vehicle was brought to a stop in the safe zone.
    SafeStop,

    /// The fault was cleared and autopilot resumed.
    Cleared,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FailureCtx {
    /// Create the context for a new fault episode.
    ///
    /// The fallback path is synthesised here, once - there is no replanning
    /// during an episode.
    pub fn new(
        onset_time_s: f64,
        nominal_path: &Path,
        current_speed_ms: f64,
        params: &Params,
    ) -> Self {
        Self {
            onset_time_s,
            fallback_path: nominal_path.offset_right(params.fallback_shift_m),
            target_speed_ms: current_speed_ms,
        }
    }

    /// Get the fallback path to track during the episode.
    pub fn fallback_path(&self) -> &Path {
        &self.fallback_path
    }

    /// Time elapsed since the fault was signalled.
    pub fn elapsed_s(&self, sim_time_s: f64) -> f64 {
        sim_time_s - self.onset_time_s
    }

    /// Advance the braking profile by one cycle and return the new target
    /// speed.
    ///
    /// While above the floor the target decreases by the braking step,
    /// clamped at the floor. A target already at or below the floor is held
    /// where it is - braking never speeds the vehicle up.
    pub fn brake_step(&mut self, params: &Params) -> f64 {
        if self.target_speed_ms > params.braking_floor_ms {
            self.target_speed_ms =
                (self.target_speed_ms - params.braking_step_ms).max(params.braking_floor_ms);
        }

        self.target_speed_ms
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::PathEndMode;
    use nalgebra::Vector2;

    fn test_params() -> Params {
        Params {
            fallback_shift_m: 0.5,
            braking_step_ms: 0.1,
            braking_floor_ms: 0.5,
            stop_timeout_s: 5.0,
            manual_steer_rate_rads: 0.5,
        }
    }

    #[test]
    fn test_braking_profile() {
        let path = Path {
            points_m: vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)],
            end_mode: PathEndMode::Clamp,
        };
        let params = test_params();

        let mut ctx = FailureCtx::new(0.0, &path, 2.0, &params);

        // Strictly decreasing by the step until the floor is reached
        let mut prev_speed_ms = 2.0;
        for _ in 0..15 {
            let speed_ms = ctx.brake_step(&params);
            assert!(speed_ms < prev_speed_ms);
            assert!(speed_ms >= params.braking_floor_ms);
            prev_speed_ms = speed_ms;
        }

        assert!((prev_speed_ms - params.braking_floor_ms).abs() < 1e-9);

        // Held at the floor from then on
        for _ in 0..10 {
            assert!((ctx.brake_step(&params) - params.braking_floor_ms).abs() < 1e-9);
        }
    }

    #[test]
    fn test_braking_below_floor_is_held() {
        let path = Path::new_empty();
        let params = test_params();

        // A vehicle already slower than the floor keeps its speed, it is
        // never accelerated up to the floor
        let mut ctx = FailureCtx::new(0.0, &path, 0.3, &params);

        for _ in 0..10 {
            assert!((ctx.brake_step(&params) - 0.3).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fallback_synthesis_shifts_right() {
        let nominal = Path {
            points_m: (0..5).map(|i| Vector2::new(i as f64, 0.0)).collect(),
            end_mode: PathEndMode::Wrap,
        };
        let params = test_params();

        let ctx = FailureCtx::new(1.0, &nominal, 2.0, &params);
        let fallback = ctx.fallback_path();

        assert_eq!(fallback.get_num_points(), 4);
        assert_eq!(fallback.end_mode, PathEndMode::Clamp);

        // For a path along +x the right shoulder is -y
        for point in fallback.points_m.iter() {
            assert!((point[1] - -params.fallback_shift_m).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_nominal_path_degrades_to_empty_fallback() {
        let ctx = FailureCtx::new(0.0, &Path::new_empty(), 2.0, &test_params());

        assert!(ctx.fallback_path().is_empty());
    }

    #[test]
    fn test_elapsed() {
        let ctx = FailureCtx::new(3.0, &Path::new_empty(), 2.0, &test_params());

        assert!((ctx.elapsed_s(7.5) - 4.5).abs() < 1e-12);
    }
}
