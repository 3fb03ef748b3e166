//! Motion dynamics: the fixed sub-step kernel and stillness tracking.

pub mod kernel;
pub mod speed_history;

pub use kernel::{
    run_substeps, slide_step_seconds, step_physics, step_slide_exact, SubstepRun,
};
pub use speed_history::SpeedHistory;
