//! # Path
//!
//! This module defines the waypoint sequences tracked by the lateral
//! controllers. A path is an ordered list of 2D points; the order carries the
//! direction of travel. Whether the sequence wraps back to its first point or
//! ends at its last one differs between path sources (looped nominal courses
//! wrap, fallback paths never do), so the end behaviour is an explicit
//! property of each path rather than of the controller reading it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Epsilon added to segment lengths when normalising tangents, so that a
/// degenerate (zero length) segment offsets to its own start point instead of
/// producing NaNs.
const TANGENT_NORM_EPSILON_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path defining the desired trajectory of the vehicle.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Path {
    pub points_m: Vec<Vector2<f64>>,

    /// What happens when a point query runs off the end of the sequence.
    pub end_mode: PathEndMode,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// End-of-sequence behaviour of a path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathEndMode {
    /// The path is a closed loop, the point after the last one is the first.
    Wrap,

    /// The path is open, queries past the end clamp to the last point.
    Clamp,
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Could not load the path file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Could not read the path file: {0}")]
    DeserialiseError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a new empty path
    pub fn new_empty() -> Self {
        Path {
            points_m: Vec::new(),
            end_mode: PathEndMode::Clamp,
        }
    }

    /// Load a path from the JSON file at the given system path.
    pub fn from_file<P: AsRef<std::path::Path>>(file_path: P) -> Result<Self, PathError> {
        let path_str = std::fs::read_to_string(file_path).map_err(PathError::FileLoadError)?;

        serde_json::from_str(&path_str).map_err(PathError::DeserialiseError)
    }

    /// Get the index of the path point closest to the given position.
    ///
    /// The scan is linear and ties are broken towards the lowest index.
    /// Returns `None` if the path is empty.
    pub fn closest_point_index(&self, pos_m: &Vector2<f64>) -> Option<usize> {
        let mut closest: Option<(usize, f64)> = None;

        for (i, point) in self.points_m.iter().enumerate() {
            let dist_m = (point - pos_m).norm();

            match closest {
                Some((_, d)) if dist_m >= d => (),
                _ => closest = Some((i, dist_m)),
            }
        }

        closest.map(|(i, _)| i)
    }

    /// Get the point following the given index, honouring the path's end
    /// mode.
    ///
    /// Returns `None` if the path is empty.
    pub fn next_point(&self, index: usize) -> Option<Vector2<f64>> {
        if self.points_m.is_empty() {
            return None;
        }

        let next_index = match self.end_mode {
            PathEndMode::Wrap => (index + 1) % self.points_m.len(),
            PathEndMode::Clamp => (index + 1).min(self.points_m.len() - 1),
        };

        Some(self.points_m[next_index])
    }

    /// Get the first point at or beyond `start_index` whose distance from the
    /// given position is at least the lookahead distance.
    ///
    /// If no such point exists before the end of the sequence the final point
    /// is returned, regardless of end mode - a wrapping search on a closed
    /// course has no stable target. Returns `None` if the path is empty.
    pub fn lookahead_point(
        &self,
        start_index: usize,
        pos_m: &Vector2<f64>,
        lookahead_m: f64,
    ) -> Option<Vector2<f64>> {
        if self.points_m.is_empty() {
            return None;
        }

        for point in self.points_m.iter().skip(start_index) {
            if (point - pos_m).norm() >= lookahead_m {
                return Some(*point);
            }
        }

        self.points_m.last().copied()
    }

    /// Produce a copy of this path shifted laterally towards the right
    /// shoulder by the given distance.
    ///
    /// For each consecutive pair of points the segment's unit tangent is
    /// rotated 90 degrees to get the leftward normal, and the first point of
    /// the segment is shifted along the negative of that normal. The result
    /// is one point shorter than the input and is always an open path. An
    /// empty or single-point path produces an empty path.
    pub fn offset_right(&self, shift_m: f64) -> Path {
        let mut points_m = Vec::new();

        for pair in self.points_m.windows(2) {
            let dir = pair[1] - pair[0];
            let unit = dir / (dir.norm() + TANGENT_NORM_EPSILON_M);
            let normal = Vector2::new(-unit[1], unit[0]);

            points_m.push(pair[0] - shift_m * normal);
        }

        Path {
            points_m,
            end_mode: PathEndMode::Clamp,
        }
    }

    /// Get the number of points in the path
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.len() == 0
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A straight path along the +x axis with 1 m point separation.
    fn straight_path(num_points: usize, end_mode: PathEndMode) -> Path {
        Path {
            points_m: (0..num_points)
                .map(|i| Vector2::new(i as f64, 0.0))
                .collect(),
            end_mode,
        }
    }

    #[test]
    fn test_closest_point_index() {
        let path = straight_path(5, PathEndMode::Clamp);

        assert_eq!(
            path.closest_point_index(&Vector2::new(2.2, 1.0)),
            Some(2)
        );

        // Ties break towards the lowest index
        assert_eq!(
            path.closest_point_index(&Vector2::new(1.5, 0.0)),
            Some(1)
        );

        assert_eq!(Path::new_empty().closest_point_index(&Vector2::zeros()), None);
    }

    #[test]
    fn test_next_point_end_modes() {
        let wrapped = straight_path(3, PathEndMode::Wrap);
        let clamped = straight_path(3, PathEndMode::Clamp);

        assert_eq!(wrapped.next_point(1), Some(Vector2::new(2.0, 0.0)));
        assert_eq!(wrapped.next_point(2), Some(Vector2::new(0.0, 0.0)));

        assert_eq!(clamped.next_point(1), Some(Vector2::new(2.0, 0.0)));
        assert_eq!(clamped.next_point(2), Some(Vector2::new(2.0, 0.0)));

        assert_eq!(Path::new_empty().next_point(0), None);
    }

    #[test]
    fn test_lookahead_point() {
        let path = straight_path(10, PathEndMode::Clamp);
        let pos = Vector2::new(1.2, 0.0);

        // First point at least 2.5 m from x = 1.2 is x = 4.0
        assert_eq!(
            path.lookahead_point(1, &pos, 2.5),
            Some(Vector2::new(4.0, 0.0))
        );

        // A lookahead longer than the remaining path falls back to the last
        // point
        assert_eq!(
            path.lookahead_point(1, &pos, 100.0),
            Some(Vector2::new(9.0, 0.0))
        );

        assert_eq!(Path::new_empty().lookahead_point(0, &pos, 1.0), None);
    }

    #[test]
    fn test_offset_right_straight_path() {
        let path = straight_path(5, PathEndMode::Wrap);
        let shift_m = 0.5;

        let offset = path.offset_right(shift_m);

        // One point shorter, always open
        assert_eq!(offset.get_num_points(), 4);
        assert_eq!(offset.end_mode, PathEndMode::Clamp);

        for (src, dst) in path.points_m.iter().zip(offset.points_m.iter()) {
            let delta = dst - src;

            // Shifted by exactly the requested distance (up to the epsilon in
            // the tangent normalisation)
            assert!((delta.norm() - shift_m).abs() < 1e-5);

            // On the right hand side of the tangent: the z component of
            // tangent x delta must be negative
            let tangent = Vector2::new(1.0, 0.0);
            let cross_z = tangent[0] * delta[1] - tangent[1] * delta[0];
            assert!(cross_z < 0.0);
        }
    }

    #[test]
    fn test_offset_right_degenerate_segment() {
        // Two identical points make a zero length segment, the offset point
        // must stay finite and on the source point
        let path = Path {
            points_m: vec![Vector2::new(1.0, 1.0), Vector2::new(1.0, 1.0)],
            end_mode: PathEndMode::Clamp,
        };

        let offset = path.offset_right(0.5);

        assert_eq!(offset.get_num_points(), 1);
        assert!(offset.points_m[0][0].is_finite());
        assert!(offset.points_m[0][1].is_finite());
        assert!((offset.points_m[0] - path.points_m[0]).norm() < 1e-9);
    }

    #[test]
    fn test_offset_right_empty_path() {
        assert!(Path::new_empty().offset_right(0.5).is_empty());
    }
}
