//! Kinetic Movers – fixed-step motion for animated values.
//!
//! A mover drives a value (a number, a 2-D or 3-D vector, or a record of named
//! channels) toward a goal using a damped spring, an exponentially decaying
//! slide, or caller-driven drag and push. Each frame the runner integrates in
//! fixed sub-steps, writes the new value back to its host and decides whether
//! the motion has settled.
//!
//! Runners talk to storage through the [`MoverHost`] trait; [`MoverWorld`] is a
//! ready-made host with duration ticks, named time sources, autorun loops and
//! optional parallel stepping.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod host;
pub mod movers;
pub mod utils;
pub mod world;

pub use glam::{DVec2, DVec3};

pub use crate::core::{
    keys::{MoverKeys, RefsKey, StateKey},
    physics_config::{
        normalize_physics_config, PhysicsConfigInput, PhysicsConfigs, PhysicsOverrides,
    },
    types::{MoveMode, MoverKind, PhysicsParameters, StepState},
    value::{ChannelValues, MoverInitialState, MoverValue, StateValue},
};
pub use dynamics::{
    kernel::{run_substeps, step_physics, step_slide_exact, SubstepRun},
    speed_history::SpeedHistory,
};
pub use error::{MoverError, MoverResult};
pub use host::MoverHost;
pub use movers::{
    autorun, run_mover, run_mover_1d, run_mover_2d, run_mover_3d, run_mover_multi, step_mover,
    AnyMoverRefs, AutorunSummary, ChannelRefs, MoverDimension, MoverRefs, MultiMoverRefs,
    StepReport,
};
pub use utils::allocator::{Arena, EntityId, GenerationalId};
pub use utils::math::MotionVector;
pub use utils::profiling::TickProfile;
pub use world::{MoverSpec, MoverWorld, SlowHandler, TickSummary, TimeSources};
