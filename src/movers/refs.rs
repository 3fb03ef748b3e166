//! Private per-entity scratch data owned by each mover.

use std::collections::BTreeMap;

use glam::{DVec2, DVec3};

use crate::core::keys::MoverKeys;
use crate::core::physics_config::{normalize_physics_config, PhysicsConfigInput, PhysicsConfigs};
use crate::core::types::MoverKind;
use crate::dynamics::speed_history::SpeedHistory;
use crate::error::MoverResult;
use crate::utils::math::MotionVector;

/// Runtime refs for a scalar, 2D or 3D mover.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverRefs<V> {
    pub velocity: V,
    pub recent_speeds: SpeedHistory,
    pub keys: MoverKeys,
    pub physics_configs: PhysicsConfigs,
    /// Latch allowing `on_slow` to fire once per motion.
    pub can_run_on_slow: bool,
    /// Average speed computed by the last step.
    pub average_speed: f64,
}

impl<V: MotionVector> MoverRefs<V> {
    pub fn new(keys: MoverKeys, physics_configs: PhysicsConfigs) -> Self {
        Self {
            velocity: V::ZERO,
            recent_speeds: SpeedHistory::new(),
            keys,
            physics_configs,
            can_run_on_slow: true,
            average_speed: 0.0,
        }
    }
}

/// Per-channel refs of a multi mover.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelRefs {
    pub velocity: f64,
    pub recent_speeds: SpeedHistory,
}

/// Runtime refs for a mover animating several named scalar channels.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMoverRefs {
    pub keys: MoverKeys,
    pub physics_configs: PhysicsConfigs,
    pub channel_names: Vec<String>,
    pub channels: BTreeMap<String, ChannelRefs>,
}

impl MultiMoverRefs {
    pub fn new<I, S>(keys: MoverKeys, physics_configs: PhysicsConfigs, channel_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channel_names: Vec<String> = channel_names.into_iter().map(Into::into).collect();
        let channels = channel_names
            .iter()
            .map(|name| (name.clone(), ChannelRefs::default()))
            .collect();

        Self {
            keys,
            physics_configs,
            channel_names,
            channels,
        }
    }
}

/// Refs for any mover kind, as stored by a host.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMoverRefs {
    Scalar(MoverRefs<f64>),
    Planar(MoverRefs<DVec2>),
    Spatial(MoverRefs<DVec3>),
    Multi(MultiMoverRefs),
}

impl AnyMoverRefs {
    /// Builds refs for `kind` from a base name and optional physics input.
    ///
    /// Preset strings normalize to nothing; the mover then runs on the kind
    /// defaults. Every resulting variant is validated.
    pub fn build(
        kind: MoverKind,
        base: &str,
        physics: Option<&PhysicsConfigInput>,
        channel_names: &[String],
    ) -> MoverResult<Self> {
        let keys = MoverKeys::new(base);
        let physics_configs = match normalize_physics_config(physics, kind) {
            Some(configs) => configs,
            None => {
                log::warn!(
                    "mover `{base}`: physics presets are not supported, using {kind} defaults"
                );
                PhysicsConfigs::new()
            }
        };
        physics_configs.validate()?;

        Ok(match kind {
            MoverKind::OneD => AnyMoverRefs::Scalar(MoverRefs::new(keys, physics_configs)),
            MoverKind::TwoD => AnyMoverRefs::Planar(MoverRefs::new(keys, physics_configs)),
            MoverKind::ThreeD => AnyMoverRefs::Spatial(MoverRefs::new(keys, physics_configs)),
            MoverKind::Multi => AnyMoverRefs::Multi(MultiMoverRefs::new(
                keys,
                physics_configs,
                channel_names.iter().cloned(),
            )),
        })
    }

    pub fn kind(&self) -> MoverKind {
        match self {
            AnyMoverRefs::Scalar(_) => MoverKind::OneD,
            AnyMoverRefs::Planar(_) => MoverKind::TwoD,
            AnyMoverRefs::Spatial(_) => MoverKind::ThreeD,
            AnyMoverRefs::Multi(_) => MoverKind::Multi,
        }
    }

    pub fn keys(&self) -> &MoverKeys {
        match self {
            AnyMoverRefs::Scalar(refs) => &refs.keys,
            AnyMoverRefs::Planar(refs) => &refs.keys,
            AnyMoverRefs::Spatial(refs) => &refs.keys,
            AnyMoverRefs::Multi(refs) => &refs.keys,
        }
    }

    pub fn physics_configs(&self) -> &PhysicsConfigs {
        match self {
            AnyMoverRefs::Scalar(refs) => &refs.physics_configs,
            AnyMoverRefs::Planar(refs) => &refs.physics_configs,
            AnyMoverRefs::Spatial(refs) => &refs.physics_configs,
            AnyMoverRefs::Multi(refs) => &refs.physics_configs,
        }
    }

    /// Forgets recorded speeds so the warm-up guard applies again.
    pub fn clear_speeds(&mut self) {
        match self {
            AnyMoverRefs::Scalar(refs) => refs.recent_speeds.clear(),
            AnyMoverRefs::Planar(refs) => refs.recent_speeds.clear(),
            AnyMoverRefs::Spatial(refs) => refs.recent_speeds.clear(),
            AnyMoverRefs::Multi(refs) => refs
                .channels
                .values_mut()
                .for_each(|channel| channel.recent_speeds.clear()),
        }
    }

    /// Prepares the refs for a motion starting from rest.
    pub fn begin_motion(&mut self) {
        self.clear_speeds();
        match self {
            AnyMoverRefs::Scalar(refs) => refs.can_run_on_slow = true,
            AnyMoverRefs::Planar(refs) => refs.can_run_on_slow = true,
            AnyMoverRefs::Spatial(refs) => refs.can_run_on_slow = true,
            AnyMoverRefs::Multi(_) => {}
        }
    }
}

/// Value types with their own refs variant.
pub trait MoverDimension: MotionVector {
    const KIND: MoverKind;

    fn refs(any: &AnyMoverRefs) -> Option<&MoverRefs<Self>>;
    fn refs_mut(any: &mut AnyMoverRefs) -> Option<&mut MoverRefs<Self>>;
}

impl MoverDimension for f64 {
    const KIND: MoverKind = MoverKind::OneD;

    fn refs(any: &AnyMoverRefs) -> Option<&MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Scalar(refs) => Some(refs),
            _ => None,
        }
    }

    fn refs_mut(any: &mut AnyMoverRefs) -> Option<&mut MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Scalar(refs) => Some(refs),
            _ => None,
        }
    }
}

impl MoverDimension for DVec2 {
    const KIND: MoverKind = MoverKind::TwoD;

    fn refs(any: &AnyMoverRefs) -> Option<&MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Planar(refs) => Some(refs),
            _ => None,
        }
    }

    fn refs_mut(any: &mut AnyMoverRefs) -> Option<&mut MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Planar(refs) => Some(refs),
            _ => None,
        }
    }
}

impl MoverDimension for DVec3 {
    const KIND: MoverKind = MoverKind::ThreeD;

    fn refs(any: &AnyMoverRefs) -> Option<&MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Spatial(refs) => Some(refs),
            _ => None,
        }
    }

    fn refs_mut(any: &mut AnyMoverRefs) -> Option<&mut MoverRefs<Self>> {
        match any {
            AnyMoverRefs::Spatial(refs) => Some(refs),
            _ => None,
        }
    }
}
