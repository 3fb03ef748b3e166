use std::time::{Duration, Instant};

/// Timing and counts gathered by the most recent world tick.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TickProfile {
    pub step_time: Duration,
    pub handler_time: Duration,
    pub total_frame_time: Duration,

    pub entity_count: usize,
    pub movers_stepped: usize,
    pub movers_stopped: usize,
    pub parallel: bool,
}

impl TickProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Logs the profile at debug level.
    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f64;
        if total_us < 1.0 {
            return;
        }

        log::debug!(
            "mover tick: {} entities, {} stepped, {} stopped, {} ({:.3} ms)",
            self.entity_count,
            self.movers_stepped,
            self.movers_stopped,
            if self.parallel { "parallel" } else { "sequential" },
            self.total_frame_time.as_secs_f64() * 1000.0
        );
        log::debug!(
            "  stepping: {:.3} ms ({:.1}%), on-slow handlers: {:.3} ms ({:.1}%)",
            self.step_time.as_secs_f64() * 1000.0,
            (self.step_time.as_micros() as f64 / total_us) * 100.0,
            self.handler_time.as_secs_f64() * 1000.0,
            (self.handler_time.as_micros() as f64 / total_us) * 100.0
        );
    }
}

/// Adds the time until drop to `output`.
pub struct ScopedTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
