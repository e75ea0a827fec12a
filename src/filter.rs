//! Broad-phase collision layers and the pairwise filter table.

use log::debug;
use rapier3d::prelude::{Group, InteractionGroups, InteractionTestMode};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Maximum number of layers a filter table can hold (one bit per layer).
pub const MAX_COLLISION_LAYERS: usize = 32;

/// Coarse object category mapped to a broad-phase layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u8);

impl CollisionLayer {
    /// Non-moving scene geometry.
    pub const STATIC: CollisionLayer = CollisionLayer(0);
    /// Simulated and kinematic bodies.
    pub const DYNAMIC: CollisionLayer = CollisionLayer(1);

    fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Pairwise collision-enable table over a fixed set of layers.
///
/// Immutable after construction and consumed by [`World::new`](crate::World::new);
/// changing the filtering of a running session requires building a new world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionFilter {
    layer_count: u8,
    rows: [u32; MAX_COLLISION_LAYERS],
}

impl CollisionFilter {
    /// Builds a filter over `layer_count` layers with the given symmetric
    /// enable relation. Each pair enables collision response both ways.
    pub fn build(
        layer_count: u8,
        enabled_pairs: &[(CollisionLayer, CollisionLayer)],
    ) -> Result<Self, BridgeError> {
        if layer_count == 0 || layer_count as usize > MAX_COLLISION_LAYERS {
            return Err(BridgeError::InvalidParameter {
                name: "layer_count",
                value: layer_count as f32,
            });
        }

        let mut rows = [0u32; MAX_COLLISION_LAYERS];
        for &(a, b) in enabled_pairs {
            if a.0 >= layer_count || b.0 >= layer_count {
                return Err(BridgeError::InvalidParameter {
                    name: "layer",
                    value: a.0.max(b.0) as f32,
                });
            }
            rows[a.0 as usize] |= b.bit();
            rows[b.0 as usize] |= a.bit();
        }

        debug!(
            "collision filter built: {layer_count} layers, {} enabled pairs",
            enabled_pairs.len()
        );
        Ok(Self { layer_count, rows })
    }

    /// The canonical two-layer table: static geometry collides with dynamic
    /// bodies, dynamic bodies collide with each other, statics never pair up.
    pub fn default_static_dynamic() -> Self {
        let mut rows = [0u32; MAX_COLLISION_LAYERS];
        rows[CollisionLayer::STATIC.0 as usize] = CollisionLayer::DYNAMIC.bit();
        rows[CollisionLayer::DYNAMIC.0 as usize] =
            CollisionLayer::STATIC.bit() | CollisionLayer::DYNAMIC.bit();
        Self { layer_count: 2, rows }
    }

    pub fn layer_count(&self) -> u8 {
        self.layer_count
    }

    /// Whether collision response is enabled for the pair. Symmetric.
    pub fn is_enabled(&self, a: CollisionLayer, b: CollisionLayer) -> bool {
        if a.0 >= self.layer_count || b.0 >= self.layer_count {
            return false;
        }
        self.rows[a.0 as usize] & b.bit() != 0
    }

    /// Membership/filter groups for a body on `layer`, in the engine's
    /// broad-phase encoding.
    pub(crate) fn interaction_groups(&self, layer: CollisionLayer) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(layer.bit()),
            Group::from_bits_truncate(self.rows[layer.0 as usize]),
            InteractionTestMode::And,
        )
    }
}
