//! Core types describing movers, their physics variants, and observable state.

pub mod keys;
pub mod physics_config;
pub mod types;
pub mod value;

pub use keys::{MoverKeys, RefsKey, StateKey};
pub use physics_config::{
    normalize_physics_config, PhysicsConfigInput, PhysicsConfigs, PhysicsOverrides,
};
pub use types::{MoveMode, MoverKind, PhysicsParameters, StepState};
pub use value::{ChannelValues, MoverInitialState, MoverValue, StateValue};
