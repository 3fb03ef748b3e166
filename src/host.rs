//! Boundary between the movers and whatever stores entity state.

use crate::core::keys::{RefsKey, StateKey};
use crate::core::types::MoveMode;
use crate::core::value::{MoverValue, StateValue};
use crate::error::{MoverError, MoverResult};
use crate::movers::refs::AnyMoverRefs;
use crate::utils::allocator::EntityId;

/// Storage the runners read from and write to.
///
/// State is observable and comparable; refs are private scratch data that is
/// mutated in place and never change-tracked.
pub trait MoverHost {
    fn state(&self, entity: EntityId, key: &StateKey) -> Option<&StateValue>;

    fn set_state(&mut self, entity: EntityId, key: &StateKey, value: StateValue)
        -> MoverResult<()>;

    fn refs(&self, entity: EntityId, key: &RefsKey) -> Option<&AnyMoverRefs>;

    fn refs_mut(&mut self, entity: EntityId, key: &RefsKey) -> Option<&mut AnyMoverRefs>;
}

/// Reads a required value field.
pub fn read_value<V, H>(host: &H, entity: EntityId, key: &StateKey) -> MoverResult<V>
where
    V: MoverValue,
    H: MoverHost + ?Sized,
{
    let value = host
        .state(entity, key)
        .ok_or_else(|| MoverError::MissingState {
            key: key.to_string(),
        })?;
    V::from_state(value).ok_or_else(|| MoverError::StateTypeMismatch {
        key: key.to_string(),
        expected: V::SHAPE,
    })
}

/// Reads a flag, treating an absent field as `false`.
pub fn read_flag<H: MoverHost + ?Sized>(
    host: &H,
    entity: EntityId,
    key: &StateKey,
) -> MoverResult<bool> {
    match host.state(entity, key) {
        None => Ok(false),
        Some(value) => value.as_flag().ok_or_else(|| MoverError::StateTypeMismatch {
            key: key.to_string(),
            expected: "flag",
        }),
    }
}

/// Reads the move mode, defaulting to spring when unset.
pub fn read_mode<H: MoverHost + ?Sized>(
    host: &H,
    entity: EntityId,
    key: &StateKey,
) -> MoverResult<MoveMode> {
    match host.state(entity, key) {
        None => Ok(MoveMode::default()),
        Some(value) => value.as_mode().ok_or_else(|| MoverError::StateTypeMismatch {
            key: key.to_string(),
            expected: "move mode",
        }),
    }
}
