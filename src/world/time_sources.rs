//! Named clocks that drive selected movers instead of the world tick.

use std::collections::HashMap;

use crate::core::keys::RefsKey;
use crate::error::{MoverError, MoverResult};
use crate::utils::allocator::EntityId;

/// Registered clocks and the movers assigned to them.
#[derive(Debug, Default, Clone)]
pub struct TimeSources {
    last_elapsed: HashMap<String, f64>,
    assignments: HashMap<(EntityId, RefsKey), String>,
}

impl TimeSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` starting at zero elapsed time. Returns `false` if it
    /// already existed, in which case its clock is left alone.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.last_elapsed.contains_key(&name) {
            return false;
        }
        self.last_elapsed.insert(name, 0.0);
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.last_elapsed.contains_key(name)
    }

    /// Binds a mover to a clock. An unregistered clock is accepted with a
    /// warning; the mover then waits until the clock exists and advances.
    pub fn assign(&mut self, entity: EntityId, mover: RefsKey, name: impl Into<String>) {
        let name = name.into();
        if !self.is_registered(&name) {
            log::warn!(
                "mover `{mover}` on {entity:?} assigned to unknown time source `{name}`, it will not advance"
            );
        }
        self.assignments.insert((entity, mover), name);
    }

    pub fn unassign(&mut self, entity: EntityId, mover: &RefsKey) -> Option<String> {
        self.assignments.remove(&(entity, mover.clone()))
    }

    pub fn source_of(&self, entity: EntityId, mover: &RefsKey) -> Option<&str> {
        self.assignments
            .get(&(entity, mover.clone()))
            .map(String::as_str)
    }

    /// Records the clock's new elapsed time and returns the time passed since
    /// the previous reading. A clock that went backwards yields zero.
    pub fn advance(&mut self, name: &str, elapsed: f64) -> MoverResult<f64> {
        let Some(previous) = self.last_elapsed.get_mut(name) else {
            log::warn!("advanced unknown time source `{name}`");
            return Err(MoverError::UnknownTimeSource(name.to_string()));
        };
        let delta = (elapsed - *previous).max(0.0);
        *previous = elapsed;
        Ok(delta)
    }

    /// Drops every assignment held by a despawned entity.
    pub fn forget_entity(&mut self, entity: EntityId) {
        self.assignments.retain(|(owner, _), _| *owner != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_reports_the_delta_since_last_reading() {
        let mut sources = TimeSources::new();
        assert!(sources.register("game"));
        assert!(!sources.register("game"));

        assert_eq!(sources.advance("game", 16.0).unwrap(), 16.0);
        assert_eq!(sources.advance("game", 40.0).unwrap(), 24.0);
        assert_eq!(sources.advance("game", 10.0).unwrap(), 0.0);
        assert_eq!(sources.advance("game", 12.0).unwrap(), 2.0);
    }

    #[test]
    fn unknown_sources_are_errors_when_advanced() {
        let mut sources = TimeSources::new();
        assert_eq!(
            sources.advance("paused", 5.0),
            Err(MoverError::UnknownTimeSource("paused".to_string()))
        );
    }

    #[test]
    fn assignments_survive_until_entity_is_forgotten() {
        let mut sources = TimeSources::new();
        let entity = EntityId::new(0, 0);
        let mover = RefsKey::new("opacity");
        sources.assign(entity, mover.clone(), "menu");
        assert_eq!(sources.source_of(entity, &mover), Some("menu"));

        sources.forget_entity(entity);
        assert_eq!(sources.source_of(entity, &mover), None);
    }
}
