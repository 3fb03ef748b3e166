//! Typed state and refs keys derived once from a mover's base name.

use std::fmt;
use std::sync::Arc;

use crate::core::value::{MoverInitialState, MoverValue, StateValue};

/// Identifier of one observable state field on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Arc<str>);

impl StateKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the private runtime refs a mover keeps on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefsKey(Arc<str>);

impl RefsKey {
    /// Derives `<base>MoverRefs`.
    pub fn new(base: &str) -> Self {
        Self(Arc::from(format!("{base}MoverRefs")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every state key a mover reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoverKeys {
    pub name: Arc<str>,
    pub value: StateKey,
    pub value_goal: StateKey,
    pub is_moving: StateKey,
    pub move_mode: StateKey,
    pub move_config_name: StateKey,
    pub move_configs: StateKey,
    pub refs: RefsKey,
}

impl MoverKeys {
    pub fn new(base: &str) -> Self {
        Self {
            name: Arc::from(base),
            value: StateKey::new(base),
            value_goal: StateKey::new(format!("{base}Goal")),
            is_moving: StateKey::new(format!("{base}IsMoving")),
            move_mode: StateKey::new(format!("{base}MoveMode")),
            move_config_name: StateKey::new(format!("{base}MoveConfigName")),
            move_configs: StateKey::new(format!("{base}MoveConfigs")),
            refs: RefsKey::new(base),
        }
    }

    /// State entries for a freshly registered mover.
    ///
    /// Config name and config overrides are only present when supplied.
    pub fn initial_entries<V: MoverValue>(
        &self,
        initial: MoverInitialState<V>,
    ) -> Vec<(StateKey, StateValue)> {
        let mut entries = vec![
            (
                self.value.clone(),
                initial.value.unwrap_or_else(V::zero).into_state(),
            ),
            (
                self.value_goal.clone(),
                initial.value_goal.unwrap_or_else(V::zero).into_state(),
            ),
            (
                self.is_moving.clone(),
                StateValue::Flag(initial.is_moving.unwrap_or(false)),
            ),
            (
                self.move_mode.clone(),
                StateValue::Mode(initial.move_mode.unwrap_or_default()),
            ),
        ];

        if let Some(name) = initial.move_config_name {
            entries.push((self.move_config_name.clone(), StateValue::ConfigName(name)));
        }
        if let Some(configs) = initial.move_configs {
            entries.push((self.move_configs.clone(), StateValue::Configs(configs)));
        }

        entries
    }
}
