//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise an angle into the (-pi, pi] range.
///
/// Uses the two-argument arctangent of the angle's sine and cosine, which
/// wraps any finite angle without branching on the number of turns.
pub fn norm_angle<T>(angle_rad: T) -> T
where
    T: Float
{
    angle_rad.sin().atan2(angle_rad.cos())
}

/// Clamp a value between the given minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
