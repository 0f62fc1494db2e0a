//! Scene entities and their spawn descriptions

use crate::ecs::components::{
    CollisionStateComponent, LifecycleComponent, MovementComponent, TransformComponent,
};
use crate::foundation::collections::ColliderHandle;
use crate::foundation::math::Vec3;

/// Closed set of entity kinds taking part in collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Player or enemy ship
    Ship,
    /// Drifting rock
    Asteroid,
    /// Fired shot
    Projectile,
    /// Collectible power-up
    Pickup,
}

impl EntityKind {
    /// Whether touching an entity of kind `other` uses this entity up
    pub fn consumed_by(self, other: EntityKind) -> bool {
        match self {
            EntityKind::Ship => false,
            EntityKind::Asteroid => other == EntityKind::Projectile,
            EntityKind::Projectile => matches!(other, EntityKind::Ship | EntityKind::Asteroid),
            EntityKind::Pickup => other == EntityKind::Ship,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Ship => "ship",
            EntityKind::Asteroid => "asteroid",
            EntityKind::Projectile => "projectile",
            EntityKind::Pickup => "pickup",
        }
    }
}

/// Everything the scene stores for one entity
#[derive(Debug, Clone)]
pub struct SceneEntity {
    /// Collision response class
    pub kind: EntityKind,
    /// Position, rotation and scale
    pub transform: TransformComponent,
    /// Motion integrated every fixed step
    pub movement: MovementComponent,
    /// Age and destruction state
    pub lifecycle: LifecycleComponent,
    /// Collision notifications received
    pub contacts: CollisionStateComponent,
    pub(crate) collider: Option<ColliderHandle>,
}

impl SceneEntity {
    /// Physics collider of this entity, once registered
    pub fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }
}

/// Parameters for spawning an entity
#[derive(Debug, Clone)]
pub struct SpawnDesc {
    /// Entity kind
    pub kind: EntityKind,
    /// Initial transform; its scale is baked into the collider
    pub transform: TransformComponent,
    /// Initial motion
    pub movement: MovementComponent,
    /// Seconds until automatic destruction
    pub lifetime: Option<f32>,
    /// Local-space mesh minimum corner
    pub mesh_min: Vec3,
    /// Local-space mesh maximum corner
    pub mesh_max: Vec3,
}

impl SpawnDesc {
    /// A motionless, permanent entity with a unit cube mesh (-1..1)
    pub fn new(kind: EntityKind, transform: TransformComponent) -> Self {
        Self {
            kind,
            transform,
            movement: MovementComponent::new(),
            lifetime: None,
            mesh_min: Vec3::new(-1.0, -1.0, -1.0),
            mesh_max: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builder pattern: set motion
    pub fn with_movement(mut self, movement: MovementComponent) -> Self {
        self.movement = movement;
        self
    }

    /// Builder pattern: expire after `lifetime` seconds
    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Builder pattern: set mesh extents
    pub fn with_mesh_extents(mut self, min: Vec3, max: Vec3) -> Self {
        self.mesh_min = min;
        self.mesh_max = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_responses() {
        use EntityKind::*;

        assert!(Projectile.consumed_by(Asteroid));
        assert!(Asteroid.consumed_by(Projectile));
        assert!(!Projectile.consumed_by(Projectile));
        assert!(Pickup.consumed_by(Ship));
        assert!(!Pickup.consumed_by(Asteroid));
        assert!(!Ship.consumed_by(Asteroid));
    }
}
