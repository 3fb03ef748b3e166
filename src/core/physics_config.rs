//! Normalization of sparse, user supplied physics configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CONFIG_NAME;
use crate::core::types::{MoverKind, PhysicsParameters};
use crate::error::MoverResult;

/// Partial physics coefficients; unset fields fall back to the kind defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PhysicsOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_speed: Option<f64>,
}

impl PhysicsOverrides {
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = Some(stiffness);
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_stop_speed(mut self, stop_speed: f64) -> Self {
        self.stop_speed = Some(stop_speed);
        self
    }

    /// True when at least one coefficient is set.
    pub fn any_set(&self) -> bool {
        self.mass.is_some()
            || self.stiffness.is_some()
            || self.damping.is_some()
            || self.friction.is_some()
            || self.stop_speed.is_some()
    }

    /// Merges these overrides on top of `base`.
    pub fn apply_to(&self, base: PhysicsParameters) -> PhysicsParameters {
        PhysicsParameters {
            mass: self.mass.unwrap_or(base.mass),
            stiffness: self.stiffness.unwrap_or(base.stiffness),
            damping: self.damping.unwrap_or(base.damping),
            friction: self.friction.unwrap_or(base.friction),
            stop_speed: self.stop_speed.unwrap_or(base.stop_speed),
        }
    }
}

/// Physics configuration as written by a user.
///
/// Deserializes from a preset string, a single override object, or a map of
/// named override objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhysicsConfigInput {
    Preset(String),
    Single(PhysicsOverrides),
    Named(BTreeMap<String, PhysicsOverrides>),
}

impl PhysicsConfigInput {
    pub fn named<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = (S, PhysicsOverrides)>,
        S: Into<String>,
    {
        PhysicsConfigInput::Named(
            variants
                .into_iter()
                .map(|(name, overrides)| (name.into(), overrides))
                .collect(),
        )
    }
}

impl From<PhysicsOverrides> for PhysicsConfigInput {
    fn from(overrides: PhysicsOverrides) -> Self {
        PhysicsConfigInput::Single(overrides)
    }
}

/// Fully populated physics variants keyed by config name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicsConfigs(BTreeMap<String, PhysicsParameters>);

impl PhysicsConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single `default` variant holding the kind defaults.
    pub fn defaults(kind: MoverKind) -> Self {
        let mut configs = Self::new();
        configs.insert(DEFAULT_CONFIG_NAME, PhysicsParameters::defaults(kind));
        configs
    }

    pub fn insert(&mut self, name: impl Into<String>, params: PhysicsParameters) {
        self.0.insert(name.into(), params);
    }

    pub fn get(&self, name: &str) -> Option<&PhysicsParameters> {
        self.0.get(name)
    }

    /// Picks the named variant, falling back to `default`.
    pub fn resolve(&self, name: Option<&str>) -> Option<(&str, PhysicsParameters)> {
        name.and_then(|name| self.0.get_key_value(name))
            .or_else(|| self.0.get_key_value(DEFAULT_CONFIG_NAME))
            .map(|(name, params)| (name.as_str(), *params))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhysicsParameters)> + '_ {
        self.0.iter().map(|(name, params)| (name.as_str(), params))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> MoverResult<()> {
        for (name, params) in &self.0 {
            params.validate(name)?;
        }
        Ok(())
    }
}

/// Turns user input into a fully populated variant map.
///
/// Input counts as a single config when any coefficient is set at the top
/// level; otherwise every key is a named variant. Preset strings are
/// recognized but yield `None`.
pub fn normalize_physics_config(
    input: Option<&PhysicsConfigInput>,
    kind: MoverKind,
) -> Option<PhysicsConfigs> {
    let defaults = PhysicsParameters::defaults(kind);

    match input {
        None => Some(PhysicsConfigs::defaults(kind)),
        Some(PhysicsConfigInput::Preset(_)) => None,
        Some(PhysicsConfigInput::Single(overrides)) => {
            let mut configs = PhysicsConfigs::new();
            if overrides.any_set() {
                configs.insert(DEFAULT_CONFIG_NAME, overrides.apply_to(defaults));
            }
            Some(configs)
        }
        Some(PhysicsConfigInput::Named(variants)) => {
            let mut configs = PhysicsConfigs::new();
            for (name, overrides) in variants {
                configs.insert(name.clone(), overrides.apply_to(defaults));
            }
            Some(configs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_yields_default_variant() {
        let configs = normalize_physics_config(None, MoverKind::ThreeD).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(
            configs.get("default"),
            Some(&PhysicsParameters::defaults(MoverKind::ThreeD))
        );
    }

    #[test]
    fn single_override_merges_onto_defaults() {
        let input = PhysicsConfigInput::from(PhysicsOverrides::default().with_stiffness(30.0));
        let configs = normalize_physics_config(Some(&input), MoverKind::OneD).unwrap();
        let params = configs.get("default").copied().unwrap();
        assert_eq!(params.stiffness, 30.0);
        assert_eq!(params.mass, 41.5);
        assert_eq!(params.damping, 1.0);
        assert_eq!(params.friction, 0.16);
        assert_eq!(params.stop_speed, 0.01);
    }

    #[test]
    fn named_variants_are_merged_independently() {
        let input = PhysicsConfigInput::named([
            ("slow", PhysicsOverrides::default().with_friction(0.5)),
            ("fast", PhysicsOverrides::default().with_friction(0.05)),
        ]);
        let configs = normalize_physics_config(Some(&input), MoverKind::OneD).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs.get("slow").unwrap().friction, 0.5);
        assert_eq!(configs.get("fast").unwrap().friction, 0.05);
        assert_eq!(configs.get("fast").unwrap().stiffness, 20.0);
        assert!(configs.get("default").is_none());
    }

    #[test]
    fn preset_strings_normalize_to_nothing() {
        let input = PhysicsConfigInput::Preset("bouncy".to_string());
        assert!(normalize_physics_config(Some(&input), MoverKind::TwoD).is_none());
    }

    #[test]
    fn empty_single_override_has_no_variants() {
        let input = PhysicsConfigInput::Single(PhysicsOverrides::default());
        let configs = normalize_physics_config(Some(&input), MoverKind::OneD).unwrap();
        assert!(configs.is_empty());
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let mut configs = PhysicsConfigs::defaults(MoverKind::OneD);
        let mut fast = PhysicsParameters::defaults(MoverKind::OneD);
        fast.stiffness = 80.0;
        configs.insert("fast", fast);

        assert_eq!(configs.resolve(Some("fast")).unwrap().0, "fast");
        assert_eq!(configs.resolve(Some("missing")).unwrap().0, "default");
        assert_eq!(configs.resolve(None).unwrap().1.stiffness, 20.0);
        assert!(PhysicsConfigs::new().resolve(None).is_none());
    }
}
