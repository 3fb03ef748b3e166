//! Additional math helpers layered on top of `glam`.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use glam::{DVec2, DVec3};

use crate::config::BASICALLY_ZERO;

/// Arithmetic shared by scalar, 2D and 3D positions and velocities.
pub trait MotionVector:
    Copy
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;

    /// Magnitude of the vector.
    fn speed(self) -> f64;

    /// Sum of absolute components.
    fn quick_distance(self) -> f64;

    /// Every component strictly below [`BASICALLY_ZERO`].
    fn is_basically_zero(self) -> bool;

    /// Scales the magnitude by `factor` while keeping the direction.
    fn with_decayed_speed(self, factor: f64) -> Self;

    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl MotionVector for f64 {
    const ZERO: Self = 0.0;

    fn speed(self) -> f64 {
        self.abs()
    }

    fn quick_distance(self) -> f64 {
        self.abs()
    }

    fn is_basically_zero(self) -> bool {
        self.abs() < BASICALLY_ZERO
    }

    fn with_decayed_speed(self, factor: f64) -> Self {
        self * factor
    }
}

impl MotionVector for DVec2 {
    const ZERO: Self = DVec2::ZERO;

    fn speed(self) -> f64 {
        self.length()
    }

    fn quick_distance(self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    fn is_basically_zero(self) -> bool {
        self.abs().max_element() < BASICALLY_ZERO
    }

    fn with_decayed_speed(self, factor: f64) -> Self {
        decay_along_direction(self, self.length(), factor)
    }
}

impl MotionVector for DVec3 {
    const ZERO: Self = DVec3::ZERO;

    fn speed(self) -> f64 {
        self.length()
    }

    fn quick_distance(self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    fn is_basically_zero(self) -> bool {
        self.abs().max_element() < BASICALLY_ZERO
    }

    fn with_decayed_speed(self, factor: f64) -> Self {
        decay_along_direction(self, self.length(), factor)
    }
}

fn decay_along_direction<V: MotionVector>(velocity: V, speed: f64, factor: f64) -> V {
    if speed <= f64::EPSILON {
        return V::ZERO;
    }
    let direction = velocity / speed;
    direction * (speed * factor).max(0.0)
}

/// Moves from `current` toward `previous` by `amount` (0 keeps `current`).
pub fn interpolate<V: MotionVector>(current: V, previous: V, amount: f64) -> V {
    current + (previous - current) * amount
}
