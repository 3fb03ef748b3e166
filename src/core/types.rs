use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_DAMPING, DEFAULT_FRICTION, DEFAULT_MASS, DEFAULT_STIFFNESS, DEFAULT_STOP_SPEED_1D,
    DEFAULT_STOP_SPEED_2D, DEFAULT_STOP_SPEED_3D, DEFAULT_STOP_SPEED_MULTI,
};
use crate::error::{MoverError, MoverResult};

/// How a mover drives its value toward the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MoveMode {
    /// Damped spring pulling toward the goal.
    #[default]
    Spring,
    /// Exponential speed decay, the goal is ignored.
    Slide,
    /// Caller-driven; velocity is left untouched.
    Drag,
    /// Caller-driven; velocity is left untouched.
    Push,
}

impl MoveMode {
    /// Spring and slide settle on their own, drag and push are driven externally.
    pub fn is_auto(self) -> bool {
        matches!(self, MoveMode::Spring | MoveMode::Slide)
    }
}

/// Dimensionality of the value a mover animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoverKind {
    #[serde(rename = "1d")]
    OneD,
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "multi")]
    Multi,
}

impl MoverKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MoverKind::OneD => "1d",
            MoverKind::TwoD => "2d",
            MoverKind::ThreeD => "3d",
            MoverKind::Multi => "multi",
        }
    }

    /// Stop speed used when a physics variant does not override it.
    pub fn default_stop_speed(self) -> f64 {
        match self {
            MoverKind::OneD => DEFAULT_STOP_SPEED_1D,
            MoverKind::TwoD => DEFAULT_STOP_SPEED_2D,
            MoverKind::ThreeD => DEFAULT_STOP_SPEED_3D,
            MoverKind::Multi => DEFAULT_STOP_SPEED_MULTI,
        }
    }
}

impl fmt::Display for MoverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoverKind {
    type Err = MoverError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "1d" => Ok(MoverKind::OneD),
            "2d" => Ok(MoverKind::TwoD),
            "3d" => Ok(MoverKind::ThreeD),
            "multi" => Ok(MoverKind::Multi),
            other => Err(MoverError::UnknownMoverKind(other.to_string())),
        }
    }
}

/// Fully populated physics coefficients for one named variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsParameters {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub friction: f64,
    pub stop_speed: f64,
}

impl PhysicsParameters {
    /// Defaults for a mover kind; only `stop_speed` differs between kinds.
    pub fn defaults(kind: MoverKind) -> Self {
        Self {
            mass: DEFAULT_MASS,
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            friction: DEFAULT_FRICTION,
            stop_speed: kind.default_stop_speed(),
        }
    }

    /// Rejects coefficients that would turn the integration into NaN or infinity.
    pub fn validate(&self, name: &str) -> MoverResult<()> {
        let invalid = |reason: String| {
            Err(MoverError::InvalidPhysics {
                name: name.to_string(),
                reason,
            })
        };

        let fields = [
            ("mass", self.mass),
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("friction", self.friction),
            ("stopSpeed", self.stop_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return invalid(format!("{field} must be finite, got {value}"));
            }
        }
        if self.mass <= 0.0 {
            return invalid(format!("mass must be positive, got {}", self.mass));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return invalid(format!(
                "friction must be within [0, 1], got {}",
                self.friction
            ));
        }
        Ok(())
    }
}

/// Position and velocity carried through the sub-step loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepState<V> {
    pub position: V,
    pub velocity: V,
}

impl<V> StepState<V> {
    pub fn new(position: V, velocity: V) -> Self {
        Self { position, velocity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_differ_only_in_stop_speed() {
        let one = PhysicsParameters::defaults(MoverKind::OneD);
        let three = PhysicsParameters::defaults(MoverKind::ThreeD);
        assert_eq!(one.mass, three.mass);
        assert_eq!(one.friction, three.friction);
        assert!((one.stop_speed - 0.01).abs() < 1e-12);
        assert!((three.stop_speed - 0.5).abs() < 1e-12);
        assert!((PhysicsParameters::defaults(MoverKind::TwoD).stop_speed - 1.0).abs() < 1e-12);
        assert!((PhysicsParameters::defaults(MoverKind::Multi).stop_speed - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_is_rejected() {
        let mut params = PhysicsParameters::defaults(MoverKind::OneD);
        params.mass = 0.0;
        let err = params.validate("default").unwrap_err();
        assert!(matches!(err, MoverError::InvalidPhysics { .. }));

        params.mass = f64::NAN;
        assert!(params.validate("default").is_err());
    }

    #[test]
    fn friction_outside_unit_range_is_rejected() {
        let mut params = PhysicsParameters::defaults(MoverKind::TwoD);
        params.friction = 1.5;
        assert!(params.validate("slippery").is_err());
        params.friction = 1.0;
        assert!(params.validate("slippery").is_ok());
    }

    #[test]
    fn kind_tags_round_trip_through_from_str() {
        for kind in [
            MoverKind::OneD,
            MoverKind::TwoD,
            MoverKind::ThreeD,
            MoverKind::Multi,
        ] {
            assert_eq!(kind.as_str().parse::<MoverKind>().unwrap(), kind);
        }
        assert!(matches!(
            "4d".parse::<MoverKind>(),
            Err(MoverError::UnknownMoverKind(_))
        ));
    }

    #[test]
    fn only_spring_and_slide_are_auto() {
        assert!(MoveMode::Spring.is_auto());
        assert!(MoveMode::Slide.is_auto());
        assert!(!MoveMode::Drag.is_auto());
        assert!(!MoveMode::Push.is_auto());
    }
}
