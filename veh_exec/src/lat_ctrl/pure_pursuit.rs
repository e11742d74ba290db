//! # Pure pursuit steering law
//!
//! The geometric path tracking law: chase a target point on the path one
//! lookahead distance ahead of the vehicle. The lookahead scales with speed,
//! trading responsiveness for stability as the vehicle goes faster, with a
//! configured minimum so a stationary vehicle still has a target. The
//! steering command is `atan(2 L sin(err) / lookahead)`, saturated at the
//! maximum steering angle.
//!
//! Unlike the proportional law the target search never wraps: near the end
//! of the path the final point is used.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::state::law_context;
use super::{Params, SteeringLaw, SteeringOutput};
use crate::path::Path;
use crate::veh_model::PoseHistory;
use util::maths::{clamp, norm_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pure pursuit steering law.
pub struct PurePursuit;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringLaw for PurePursuit {
    fn compute_steering(
        &self,
        history: &PoseHistory,
        path: &Path,
        speed_ms: f64,
        params: &Params,
    ) -> SteeringOutput {
        let ctx = match law_context(history, path) {
            Some(c) => c,
            None => return SteeringOutput::default(),
        };

        // Lookahead distance scales with speed, floored at the configured
        // minimum
        let lookahead_m = (params.lookahead_gain * speed_ms).max(params.min_lookahead_distance_m);

        let target_m = match path.lookahead_point(ctx.closest_index, &ctx.position_m, lookahead_m) {
            Some(t) => t,
            None => return SteeringOutput::default(),
        };

        // Bearing to the target point
        let to_target = target_m - ctx.position_m;
        let alpha_rad = to_target[1].atan2(to_target[0]);

        let heading_err_rad = norm_angle(alpha_rad - ctx.heading_rad);

        // Pure pursuit steering formula
        let steer_demand_rad =
            (2.0 * params.wheelbase_m * heading_err_rad.sin() / lookahead_m).atan();

        // Apply the steering angle limit
        let max_steer_rad = params.max_steering_angle_rad();
        let steer_rad = clamp(&steer_demand_rad, &-max_steer_rad, &max_steer_rad);

        SteeringOutput {
            steer_rad,
            steer_demand_rad,
            heading_err_rad,
            saturated: steer_demand_rad.abs() > max_steer_rad,
        }
    }

    fn name(&self) -> &'static str {
        "PurePursuit"
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::lat_ctrl::ControllerType;
    use crate::path::PathEndMode;
    use crate::veh_model::Pose;
    use nalgebra::Vector2;

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

    fn history_from(positions: &[(f64, f64)]) -> PoseHistory {
        let mut history = PoseHistory::new(positions.len().max(2));

        for (x, y) in positions.iter() {
            history.push(Pose {
                position_m: Vector2::new(*x, *y),
                heading_rad: 0.0,
                speed_ms: 2.0,
            });
        }

        history
    }

    /// A straight path along the +x axis with 0.1 m point separation.
    fn dense_straight_path(num_points: usize) -> Path {
        Path {
            points_m: (0..num_points)
                .map(|i| Vector2::new(i as f64 * 0.1, 0.0))
                .collect(),
            end_mode: PathEndMode::Clamp,
        }
    }

    #[test]
    fn test_fails_soft() {
        let law = PurePursuit;
        let params = test_params();

        let out = law.compute_steering(
            &history_from(&[(0.0, 0.0), (0.1, 0.0)]),
            &Path::new_empty(),
            2.0,
            &params,
        );
        assert_eq!(out.steer_rad, 0.0);

        let out = law.compute_steering(
            &history_from(&[(0.0, 0.0)]),
            &dense_straight_path(50),
            2.0,
            &params,
        );
        assert_eq!(out.steer_rad, 0.0);
    }

    #[test]
    fn test_aligned_on_path_is_neutral() {
        // Vehicle on the path, aligned: target is dead ahead, steering zero
        let law = PurePursuit;
        let out = law.compute_steering(
            &history_from(&[(-0.1, 0.0), (0.0, 0.0)]),
            &dense_straight_path(50),
            2.0,
            &test_params(),
        );

        assert!(out.steer_rad.abs() < 1e-12);
        assert!(!out.saturated);
    }

    #[test]
    fn test_lateral_offset_saturates_correcting() {
        // Vehicle 1 m left of the path (+y), moving parallel to it. The
        // target is the nearest point straight below, so the raw demand is
        // far beyond the limit and the command saturates steering right
        // (negative)
        let law = PurePursuit;
        let params = test_params();

        let out = law.compute_steering(
            &history_from(&[(0.0, 1.0), (0.1, 1.0)]),
            &dense_straight_path(100),
            2.0,
            &params,
        );

        let max_steer_rad = params.max_steering_angle_rad();
        assert!((out.steer_rad - -max_steer_rad).abs() < 1e-12);
        assert!(out.saturated);
        assert!(out.steer_demand_rad < -max_steer_rad);
    }

    #[test]
    fn test_saturation_bound_holds_everywhere() {
        // Sweep the vehicle across lateral offsets and headings, the applied
        // steering must never exceed the limit
        let law = PurePursuit;
        let params = test_params();
        let path = dense_straight_path(100);
        let max_steer_rad = params.max_steering_angle_rad();

        let mut offset = -3.0;
        while offset <= 3.0 {
            let out = law.compute_steering(
                &history_from(&[(0.0, offset), (0.1, offset + 0.05)]),
                &path,
                2.0,
                &params,
            );

            assert!(out.steer_rad.abs() <= max_steer_rad + 1e-12);
            assert!(out.heading_err_rad.abs() <= std::f64::consts::PI + 1e-12);

            offset += 0.25;
        }
    }

    #[test]
    fn test_zero_speed_uses_min_lookahead() {
        // At zero speed the lookahead floors at the minimum rather than
        // collapsing to zero
        let law = PurePursuit;
        let out = law.compute_steering(
            &history_from(&[(-0.1, 0.0), (0.0, 0.0)]),
            &dense_straight_path(50),
            0.0,
            &test_params(),
        );

        // Target is ~1 m ahead on the path, still dead ahead
        assert!(out.steer_rad.abs() < 1e-12);
    }
}
