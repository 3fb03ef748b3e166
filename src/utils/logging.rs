use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Trace-level span around one stepping pass, tagged with the entity count.
pub struct TraceSpan {
    label: &'static str,
    entities: usize,
    start: Option<Instant>,
}

impl TraceSpan {
    pub fn new(label: &'static str, entities: usize) -> Self {
        let start = log_enabled!(Level::Trace).then(|| {
            log::trace!("{label}: stepping {entities} entities");
            Instant::now()
        });
        Self {
            label,
            entities,
            start,
        }
    }
}

impl Drop for TraceSpan {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            log::trace!(
                "{}: {} entities in {} µs",
                self.label,
                self.entities,
                start.elapsed().as_micros()
            );
        }
    }
}

/// Warns when stepping took longer than the frame it simulated.
pub fn warn_if_frame_budget_exceeded(duration: Duration, budget_ms: f64) {
    let spent_ms = duration.as_secs_f64() * 1000.0;
    if spent_ms > budget_ms {
        warn!("mover tick exceeded frame budget: {spent_ms:.2} ms > {budget_ms:.2} ms");
    }
}
