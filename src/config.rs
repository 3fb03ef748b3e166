//! Global configuration constants for the Kinetic Movers engine.
//!
//! Times are expressed in milliseconds unless the name says otherwise.

/// Duration of one fixed physics sub-step.
pub const PHYSICS_TIMESTEP: f64 = 0.5;

/// [`PHYSICS_TIMESTEP`] expressed in seconds, used to integrate position.
pub const PHYSICS_TIMESTEP_IN_SECONDS: f64 = PHYSICS_TIMESTEP * 0.001;

/// Capacity of the recent-speed ring buffer kept per mover (or per channel).
pub const RECENT_SPEEDS_AMOUNT: usize = 10;

/// Samples required before the recent-speed average is trusted.
pub const MIN_SPEED_SAMPLES: usize = RECENT_SPEEDS_AMOUNT - 1;

/// Frame duration assumed when the caller does not provide one.
pub const DEFAULT_FRAME_DURATION: f64 = 16.6667;

/// Upper bound applied to frame durations fed through a world tick.
pub const MAXIMUM_FRAME_TIME: f64 = 250.0;

/// Upper bound for the single exact slide step.
pub const MAXIMUM_SLIDE_FRAME_TIME: f64 = 100.0;

/// Name of the physics variant used when no config name is selected.
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Default spring mass.
pub const DEFAULT_MASS: f64 = 41.5;

/// Default spring stiffness.
pub const DEFAULT_STIFFNESS: f64 = 20.0;

/// Default spring damping.
pub const DEFAULT_DAMPING: f64 = 1.0;

/// Default slide friction (fraction of speed lost per second-ish unit).
pub const DEFAULT_FRICTION: f64 = 0.16;

/// Default stop speeds per mover kind.
pub const DEFAULT_STOP_SPEED_1D: f64 = 0.01;
pub const DEFAULT_STOP_SPEED_2D: f64 = 1.0;
pub const DEFAULT_STOP_SPEED_3D: f64 = 0.5;
pub const DEFAULT_STOP_SPEED_MULTI: f64 = 1.0;

/// Average speed below which a scalar non-spring motion is considered still.
pub const SCALAR_STILL_SPEED: f64 = 0.003;

/// Fixed spring stop speed used by each channel of a multi mover.
pub const CHANNEL_SPRING_STOP_SPEED: f64 = 0.01;

/// Distance to the goal under which a scalar spring counts as arrived.
pub const NEAR_TARGET_DISTANCE: f64 = 0.01;

/// Manhattan distance to the goal under which a slow 3D mover may stop.
pub const QUICK_DISTANCE_CLOSE: f64 = 0.15;

/// Per-axis position delta treated as no movement at all.
pub const BASICALLY_ZERO: f64 = 0.01;

/// Average speed under which the one-shot `on_slow` callback fires.
pub const ON_SLOW_SPEED: f64 = 150.0;

/// Decay constant below which exact slide falls back to linear motion.
pub const SLIDE_LINEAR_FALLBACK: f64 = 1e-6;

/// Largest friction accepted by the exact slide stepper.
pub const SLIDE_MAX_FRICTION: f64 = 0.9999;
