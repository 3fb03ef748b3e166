use std::collections::BTreeMap;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::physics_config::PhysicsConfigs;
use crate::core::types::MoveMode;

/// Named scalar channels animated together by a multi mover.
pub type ChannelValues = BTreeMap<String, f64>;

/// Any value a mover stores in observable entity state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Scalar(f64),
    Vec2(DVec2),
    Vec3(DVec3),
    Channels(ChannelValues),
    Flag(bool),
    Mode(MoveMode),
    ConfigName(String),
    Configs(PhysicsConfigs),
}

impl StateValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            StateValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_mode(&self) -> Option<MoveMode> {
        match self {
            StateValue::Mode(mode) => Some(*mode),
            _ => None,
        }
    }

    pub fn as_config_name(&self) -> Option<&str> {
        match self {
            StateValue::ConfigName(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_configs(&self) -> Option<&PhysicsConfigs> {
        match self {
            StateValue::Configs(configs) => Some(configs),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(flag: bool) -> Self {
        StateValue::Flag(flag)
    }
}

impl From<MoveMode> for StateValue {
    fn from(mode: MoveMode) -> Self {
        StateValue::Mode(mode)
    }
}

/// Conversion between a mover's value type and [`StateValue`].
pub trait MoverValue: Clone + Send + Sync + 'static {
    /// Human readable shape, used in type mismatch errors.
    const SHAPE: &'static str;

    fn zero() -> Self;
    fn from_state(value: &StateValue) -> Option<Self>;
    fn into_state(self) -> StateValue;
}

impl MoverValue for f64 {
    const SHAPE: &'static str = "scalar";

    fn zero() -> Self {
        0.0
    }

    fn from_state(value: &StateValue) -> Option<Self> {
        match value {
            StateValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    fn into_state(self) -> StateValue {
        StateValue::Scalar(self)
    }
}

impl MoverValue for DVec2 {
    const SHAPE: &'static str = "2d vector";

    fn zero() -> Self {
        DVec2::ZERO
    }

    fn from_state(value: &StateValue) -> Option<Self> {
        match value {
            StateValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    fn into_state(self) -> StateValue {
        StateValue::Vec2(self)
    }
}

impl MoverValue for DVec3 {
    const SHAPE: &'static str = "3d vector";

    fn zero() -> Self {
        DVec3::ZERO
    }

    fn from_state(value: &StateValue) -> Option<Self> {
        match value {
            StateValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    fn into_state(self) -> StateValue {
        StateValue::Vec3(self)
    }
}

impl MoverValue for ChannelValues {
    const SHAPE: &'static str = "channel record";

    fn zero() -> Self {
        ChannelValues::new()
    }

    fn from_state(value: &StateValue) -> Option<Self> {
        match value {
            StateValue::Channels(channels) => Some(channels.clone()),
            _ => None,
        }
    }

    fn into_state(self) -> StateValue {
        StateValue::Channels(self)
    }
}

/// Optional starting values for a mover's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverInitialState<V> {
    pub value: Option<V>,
    pub value_goal: Option<V>,
    pub is_moving: Option<bool>,
    pub move_mode: Option<MoveMode>,
    pub move_config_name: Option<String>,
    pub move_configs: Option<PhysicsConfigs>,
}

impl<V> Default for MoverInitialState<V> {
    fn default() -> Self {
        Self {
            value: None,
            value_goal: None,
            is_moving: None,
            move_mode: None,
            move_config_name: None,
            move_configs: None,
        }
    }
}

impl<V> MoverInitialState<V> {
    pub fn at(value: V) -> Self
    where
        V: Clone,
    {
        Self {
            value: Some(value.clone()),
            value_goal: Some(value),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: MoveMode) -> Self {
        self.move_mode = Some(mode);
        self
    }

    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.move_config_name = Some(name.into());
        self
    }
}
