//! Implementations for the vehicle model state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// Internal
use super::{ControlCmd, Params, VehModelError};
use util::{maths::norm_angle, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single vehicle pose.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the vehicle.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading of the vehicle, measured from the +x axis, normalised into
    /// (-pi, pi].
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Speed applied on the cycle that produced this pose.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}

/// A bounded window of recent poses.
///
/// Only the most recent `window` poses are retained - a control loop that
/// runs for hours must not grow its memory every cycle, and heading
/// estimation only ever needs the two newest entries.
#[derive(Debug, Default, Clone)]
pub struct PoseHistory {
    window: usize,
    poses: VecDeque<Pose>,
}

/// Vehicle model state.
#[derive(Default)]
pub struct VehModel {
    params: Params,

    history: PoseHistory,
}

/// Input data to the vehicle model.
#[derive(Debug, Copy, Clone)]
pub struct InputData {
    /// The command to integrate on this cycle.
    pub cmd: ControlCmd,

    /// The integration time step.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for vehicle model processing.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Number of poses currently held in the history window.
    pub history_len: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseHistory {
    /// Create a new empty history retaining at most `window` poses.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            poses: VecDeque::with_capacity(window),
        }
    }

    /// Append a pose, evicting the oldest one if the window is full.
    pub fn push(&mut self, pose: Pose) {
        while self.poses.len() >= self.window.max(1) {
            self.poses.pop_front();
        }

        self.poses.push_back(pose);
    }

    /// Get the most recent pose, or `None` if the history is empty.
    pub fn latest(&self) -> Option<&Pose> {
        self.poses.back()
    }

    /// Get the pose before the most recent one.
    pub fn previous(&self) -> Option<&Pose> {
        if self.poses.len() < 2 {
            return None;
        }

        self.poses.get(self.poses.len() - 2)
    }

    /// Get the number of poses held.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Estimate the current heading from the finite difference of the two
    /// most recent positions.
    ///
    /// There is no heading sensor in the loop - the controllers only ever see
    /// positions, so the heading is the bearing of the last motion. Returns
    /// `None` when fewer than two poses are held.
    pub fn heading_estimate_rad(&self) -> Option<f64> {
        let latest = self.latest()?;
        let previous = self.previous()?;

        let delta = latest.position_m - previous.position_m;

        Some(delta[1].atan2(delta[0]))
    }
}

impl VehModel {
    /// Get read access to the pose history.
    pub fn history(&self) -> &PoseHistory {
        &self.history
    }
}

impl State for VehModel {
    type InitData = Params;
    type InitError = VehModelError;

    type InputData = InputData;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = VehModelError;

    /// Initialise the vehicle model.
    ///
    /// Seeds the history with the initial pose at zero speed. The controllers
    /// will output neutral steering until a second pose exists to estimate
    /// the heading from.
    fn init(&mut self, params: Self::InitData) -> Result<(), Self::InitError> {
        if params.history_window < 2 {
            return Err(VehModelError::HistoryWindowTooSmall(params.history_window));
        }

        self.history = PoseHistory::new(params.history_window);
        self.history.push(Pose {
            position_m: Vector2::new(params.initial_pos_x_m, params.initial_pos_y_m),
            heading_rad: norm_angle(params.initial_heading_rad),
            speed_ms: 0.0,
        });

        self.params = params;

        Ok(())
    }

    /// Perform cyclic processing of the vehicle model.
    ///
    /// Forward Euler step: the position advances along the current heading,
    /// then the heading integrates the steering command as a yaw rate. The
    /// new pose is appended to the history.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let current = match self.history.latest() {
            Some(p) => *p,
            None => return Err(VehModelError::NoPose),
        };

        let direction = current.heading_rad;

        let new_pose = Pose {
            position_m: Vector2::new(
                current.position_m[0] + input_data.cmd.speed_ms * direction.cos() * input_data.dt_s,
                current.position_m[1] + input_data.cmd.speed_ms * direction.sin() * input_data.dt_s,
            ),
            heading_rad: norm_angle(
                current.heading_rad + input_data.cmd.steer_rad * input_data.dt_s,
            ),
            speed_ms: input_data.cmd.speed_ms,
        };

        self.history.push(new_pose);

        Ok((
            new_pose,
            StatusReport {
                history_len: self.history.len(),
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            initial_pos_x_m: 0.0,
            initial_pos_y_m: 0.0,
            initial_heading_rad: 0.0,
            history_window: 4,
        }
    }

    #[test]
    fn test_window_too_small_is_error() {
        let mut model = VehModel::default();

        assert!(matches!(
            model.init(Params {
                history_window: 1,
                ..test_params()
            }),
            Err(VehModelError::HistoryWindowTooSmall(1))
        ));
    }

    #[test]
    fn test_straight_line_integration() {
        // Integrating with zero steering and constant speed must produce
        // exactly v * n * dt along the initial heading. The values here are
        // exact in binary so the comparison can be exact too.
        let mut model = VehModel::default();
        model.init(test_params()).unwrap();

        let input = InputData {
            cmd: ControlCmd {
                steer_rad: 0.0,
                speed_ms: 2.0,
            },
            dt_s: 0.125,
        };

        let mut last_pose = None;
        for _ in 0..16 {
            let (pose, _) = model.proc(&input).unwrap();
            last_pose = Some(pose);
        }

        let pose = last_pose.unwrap();
        assert_eq!(pose.position_m[0], 2.0 * 16.0 * 0.125);
        assert_eq!(pose.position_m[1], 0.0);
        assert_eq!(pose.heading_rad, 0.0);
    }

    #[test]
    fn test_straight_line_integration_any_heading() {
        let heading = 1.1;
        let mut model = VehModel::default();
        model
            .init(Params {
                initial_heading_rad: heading,
                ..test_params()
            })
            .unwrap();

        let input = InputData {
            cmd: ControlCmd {
                steer_rad: 0.0,
                speed_ms: 1.5,
            },
            dt_s: 0.1,
        };

        for _ in 0..10 {
            model.proc(&input).unwrap();
        }

        let pose = model.history().latest().copied().unwrap();
        let dist_m = 1.5 * 10.0 * 0.1;
        assert!((pose.position_m[0] - dist_m * heading.cos()).abs() < 1e-9);
        assert!((pose.position_m[1] - dist_m * heading.sin()).abs() < 1e-9);
        assert!((pose.heading_rad - heading).abs() < 1e-12);
    }

    #[test]
    fn test_heading_stays_normalised() {
        let mut model = VehModel::default();
        model.init(test_params()).unwrap();

        // A constant positive yaw rate winds the heading round many turns
        let input = InputData {
            cmd: ControlCmd {
                steer_rad: 1.0,
                speed_ms: 1.0,
            },
            dt_s: 0.1,
        };

        for _ in 0..200 {
            let (pose, _) = model.proc(&input).unwrap();
            assert!(pose.heading_rad <= std::f64::consts::PI + 1e-12);
            assert!(pose.heading_rad >= -std::f64::consts::PI - 1e-12);
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut model = VehModel::default();
        model.init(test_params()).unwrap();

        let input = InputData {
            cmd: ControlCmd::default(),
            dt_s: 0.1,
        };

        for _ in 0..100 {
            model.proc(&input).unwrap();
        }

        assert_eq!(model.history().len(), 4);
    }

    #[test]
    fn test_heading_estimate() {
        let mut history = PoseHistory::new(2);

        assert!(history.heading_estimate_rad().is_none());

        history.push(Pose {
            position_m: Vector2::new(0.0, 0.0),
            heading_rad: 0.0,
            speed_ms: 0.0,
        });

        // Still only one pose
        assert!(history.heading_estimate_rad().is_none());

        history.push(Pose {
            position_m: Vector2::new(1.0, 1.0),
            heading_rad: 0.0,
            speed_ms: 1.0,
        });

        let estimate = history.heading_estimate_rad().unwrap();
        assert!((estimate - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }
}
