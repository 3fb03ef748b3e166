use crate::config::{
    MAXIMUM_SLIDE_FRAME_TIME, PHYSICS_TIMESTEP, PHYSICS_TIMESTEP_IN_SECONDS,
    SLIDE_LINEAR_FALLBACK, SLIDE_MAX_FRICTION,
};
use crate::core::types::{MoveMode, PhysicsParameters, StepState};
use crate::utils::math::{interpolate, MotionVector};

/// Advances `state` by exactly one fixed sub-step.
///
/// Velocity is updated first and the new velocity moves the position
/// (symplectic Euler). Drag and push leave velocity untouched.
pub fn step_physics<V: MotionVector>(
    state: &mut StepState<V>,
    target: V,
    mode: MoveMode,
    params: &PhysicsParameters,
) {
    let new_velocity = match mode {
        MoveMode::Spring => {
            let spring_force = (state.position - target) * -params.stiffness;
            let damping_force = state.velocity * params.damping;
            let acceleration = (spring_force - damping_force) / params.mass;
            state.velocity + acceleration * PHYSICS_TIMESTEP
        }
        MoveMode::Slide => state
            .velocity
            .with_decayed_speed(slide_decay_per_substep(params.friction)),
        MoveMode::Drag | MoveMode::Push => state.velocity,
    };

    state.position += new_velocity * PHYSICS_TIMESTEP_IN_SECONDS;
    state.velocity = new_velocity;
}

/// Speed multiplier applied by one slide sub-step.
pub fn slide_decay_per_substep(friction: f64) -> f64 {
    (1.0 - friction).powf(PHYSICS_TIMESTEP_IN_SECONDS * 10.0)
}

/// Closed-form slide over `dt_seconds` under exponential speed decay.
///
/// `v(t) = v0 * (1 - friction)^t`, so the displacement is `(v0 - v1) / k` with
/// `k = -ln(1 - friction)`. Near-zero friction falls back to linear motion.
pub fn step_slide_exact<V: MotionVector>(state: &mut StepState<V>, friction: f64, dt_seconds: f64) {
    let friction = friction.clamp(0.0, SLIDE_MAX_FRICTION);
    let remain_per_second = 1.0 - friction;
    let decay = remain_per_second.powf(dt_seconds);

    let v0 = state.velocity;
    let v1 = v0 * decay;

    let k = -remain_per_second.ln();
    let moved = if k > SLIDE_LINEAR_FALLBACK {
        (v0 - v1) / k
    } else {
        v0 * dt_seconds
    };

    state.position += moved;
    state.velocity = v1;
}

/// Seconds covered by the exact slide step for one frame.
pub fn slide_step_seconds(frame_duration: f64) -> f64 {
    frame_duration.clamp(0.0, MAXIMUM_SLIDE_FRAME_TIME) / 1000.0
}

/// Result of running the fixed sub-step loop over one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstepRun<V> {
    /// Position blended between the last two sub-steps by the leftover time.
    pub output: V,
    pub substeps: u32,
    pub leftover: f64,
}

/// Steps `state` while at least one sub-step of `frame_duration` remains.
///
/// A short frame may run zero sub-steps, in which case the output is the
/// unchanged position.
pub fn run_substeps<V: MotionVector>(
    state: &mut StepState<V>,
    target: V,
    mode: MoveMode,
    params: &PhysicsParameters,
    frame_duration: f64,
) -> SubstepRun<V> {
    let mut remaining = frame_duration;
    let mut previous = *state;
    let mut substeps = 0;

    while remaining >= PHYSICS_TIMESTEP {
        previous = *state;
        step_physics(state, target, mode, params);
        remaining -= PHYSICS_TIMESTEP;
        substeps += 1;
    }

    let leftover = if substeps == 0 {
        0.0
    } else {
        remaining / PHYSICS_TIMESTEP
    };

    SubstepRun {
        output: interpolate(state.position, previous.position, leftover),
        substeps,
        leftover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MoverKind;
    use approx::assert_abs_diff_eq;
    use glam::{DVec2, DVec3};

    fn spring_params() -> PhysicsParameters {
        PhysicsParameters::defaults(MoverKind::OneD)
    }

    #[test]
    fn spring_substep_uses_updated_velocity() {
        let params = spring_params();
        let mut state = StepState::new(0.0, 0.0);
        step_physics(&mut state, 100.0, MoveMode::Spring, &params);

        let expected_velocity = (100.0 * params.stiffness / params.mass) * PHYSICS_TIMESTEP;
        assert_abs_diff_eq!(state.velocity, expected_velocity, epsilon = 1e-12);
        assert_abs_diff_eq!(
            state.position,
            expected_velocity * PHYSICS_TIMESTEP_IN_SECONDS,
            epsilon = 1e-12
        );
    }

    #[test]
    fn drag_and_push_keep_velocity() {
        let params = spring_params();
        for mode in [MoveMode::Drag, MoveMode::Push] {
            let mut state = StepState::new(DVec2::ZERO, DVec2::new(2.0, -4.0));
            step_physics(&mut state, DVec2::splat(50.0), mode, &params);
            assert_eq!(state.velocity, DVec2::new(2.0, -4.0));
            assert_abs_diff_eq!(state.position.x, 2.0 * PHYSICS_TIMESTEP_IN_SECONDS);
        }
    }

    #[test]
    fn vector_slide_matches_per_axis_decay() {
        let params = spring_params();
        let decay = slide_decay_per_substep(params.friction);

        let mut planar = StepState::new(DVec3::ZERO, DVec3::new(3.0, -1.0, 2.0));
        step_physics(&mut planar, DVec3::ZERO, MoveMode::Slide, &params);

        let mut axis = StepState::new(0.0, -1.0);
        step_physics(&mut axis, 0.0, MoveMode::Slide, &params);

        assert_abs_diff_eq!(planar.velocity.y, axis.velocity, epsilon = 1e-12);
        assert_abs_diff_eq!(planar.velocity.x, 3.0 * decay, epsilon = 1e-12);
    }

    #[test]
    fn exact_slide_agrees_with_fine_integration() {
        let friction = 0.16;
        let dt_seconds = 16.6667 / 1000.0;

        let mut exact = StepState::new(0.0, 10.0);
        step_slide_exact(&mut exact, friction, dt_seconds);

        let steps = 100_000;
        let h = dt_seconds / steps as f64;
        let k = -(1.0_f64 - friction).ln();
        let mut fine = StepState::new(0.0, 10.0);
        for _ in 0..steps {
            // midpoint rule on the same continuous law
            let v_mid = fine.velocity * (-k * h * 0.5).exp();
            fine.position += v_mid * h;
            fine.velocity *= (-k * h).exp();
        }

        assert_abs_diff_eq!(exact.position, fine.position, epsilon = 1e-6);
        assert_abs_diff_eq!(exact.velocity, fine.velocity, epsilon = 1e-6);
    }

    #[test]
    fn exact_slide_composes_over_split_frames() {
        let mut once = StepState::new(DVec2::ZERO, DVec2::new(10.0, -6.0));
        step_slide_exact(&mut once, 0.3, 0.05);

        let mut split = StepState::new(DVec2::ZERO, DVec2::new(10.0, -6.0));
        for _ in 0..10 {
            step_slide_exact(&mut split, 0.3, 0.005);
        }

        assert_abs_diff_eq!(once.position.x, split.position.x, epsilon = 1e-9);
        assert_abs_diff_eq!(once.position.y, split.position.y, epsilon = 1e-9);
        assert_abs_diff_eq!(once.velocity.x, split.velocity.x, epsilon = 1e-9);
    }

    #[test]
    fn exact_slide_without_friction_is_linear() {
        let mut state = StepState::new(1.0, 4.0);
        step_slide_exact(&mut state, 0.0, 0.5);
        assert_abs_diff_eq!(state.position, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(state.velocity, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn slide_step_is_clamped() {
        assert_abs_diff_eq!(slide_step_seconds(16.0), 0.016);
        assert_abs_diff_eq!(slide_step_seconds(5_000.0), 0.1);
        assert_eq!(slide_step_seconds(-3.0), 0.0);
    }

    #[test]
    fn substep_loop_counts_whole_substeps() {
        let params = spring_params();
        let mut state = StepState::new(0.0, 0.0);
        let run = run_substeps(&mut state, 100.0, MoveMode::Spring, &params, 16.6667);
        assert_eq!(run.substeps, 33);
        assert_abs_diff_eq!(run.leftover, 0.1667 / PHYSICS_TIMESTEP, epsilon = 1e-9);
        assert!(run.output < state.position);
        assert!(run.output > 0.0);

        let mut idle = StepState::new(5.0, 1.0);
        let run = run_substeps(&mut idle, 0.0, MoveMode::Spring, &params, 0.2);
        assert_eq!(run.substeps, 0);
        assert_eq!(run.output, 5.0);
    }
}
