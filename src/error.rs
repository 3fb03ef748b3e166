//! Mover error types

use thiserror::Error;

use crate::core::types::MoverKind;
use crate::utils::allocator::EntityId;

/// Errors that can occur while registering or stepping movers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoverError {
    /// The entity id is stale or was never spawned.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// No mover refs are registered under this key on the entity.
    #[error("no mover registered as `{0}`")]
    UnknownMover(String),

    /// A state field the mover needs is absent.
    #[error("missing state field `{key}`")]
    MissingState { key: String },

    /// A state field holds a value of the wrong shape.
    #[error("state field `{key}` is not a {expected}")]
    StateTypeMismatch { key: String, expected: &'static str },

    /// The refs registered for a mover belong to another dimensionality.
    #[error("mover kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: MoverKind, found: MoverKind },

    /// A multi mover channel is missing from the value or goal record.
    #[error("channel `{0}` is missing")]
    UnknownChannel(String),

    /// Physics parameters that would make the integration undefined.
    #[error("invalid physics variant `{name}`: {reason}")]
    InvalidPhysics { name: String, reason: String },

    /// A named time source that was never registered.
    #[error("unknown time source `{0}`")]
    UnknownTimeSource(String),

    /// A mover kind tag that is not one of `1d`, `2d`, `3d` or `multi`.
    #[error("unknown mover kind `{0}`")]
    UnknownMoverKind(String),
}

pub type MoverResult<T> = Result<T, MoverError>;
