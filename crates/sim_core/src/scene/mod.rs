//! Scene: the entity table behind the physics manager
//!
//! The scene owns every entity and answers the physics manager's questions
//! about them through [`PhysicsHost`]. Destruction is deferred: entities
//! are marked pending-destroy during a frame and removed, together with
//! their colliders, by [`Scene::cleanup`].

pub mod entity;

pub use entity::{EntityKind, SceneEntity, SpawnDesc};

use crate::ecs::components::{CollisionStateComponent, LifecycleComponent};
use crate::foundation::collections::{EntityId, HandleMap};
use crate::foundation::math::Mat4;
use crate::physics::{Collider, PhysicsError, PhysicsHost, PhysicsManager, AABB};

/// Scene errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Id does not name a live entity
    #[error("Unknown entity: {0:?}")]
    UnknownEntity(EntityId),

    /// Physics rejected the entity's collider
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Table of live entities
#[derive(Debug, Default)]
pub struct Scene {
    entities: HandleMap<EntityId, SceneEntity>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities, including those pending destruction
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    /// Look up an entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(id)
    }

    /// Iterate over all entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.entities.iter()
    }

    /// Number of live (not pending) entities of `kind`
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities
            .values()
            .filter(|e| e.kind == kind && !e.lifecycle.is_pending_destroy())
            .count()
    }

    /// Create an entity and register its collider.
    ///
    /// The collider box is the mesh extents scaled by the entity's local
    /// scale. If physics rejects it the entity is not created.
    pub fn spawn(
        &mut self,
        physics: &mut PhysicsManager,
        desc: SpawnDesc,
    ) -> Result<EntityId, SceneError> {
        let bounds = AABB::from_mesh_extents(desc.mesh_min, desc.mesh_max, desc.transform.scale);
        let lifecycle = match desc.lifetime {
            Some(lifetime) => LifecycleComponent::with_lifetime(lifetime),
            None => LifecycleComponent::permanent(),
        };
        let kind = desc.kind;
        let id = self.entities.insert(SceneEntity {
            kind,
            transform: desc.transform,
            movement: desc.movement,
            lifecycle,
            contacts: CollisionStateComponent::default(),
            collider: None,
        });

        let registered = match physics.create_collider(id, bounds) {
            Ok(handle) => physics.add_collider(handle, &*self).map(|()| handle),
            Err(err) => Err(err),
        };
        match registered {
            Ok(handle) => {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.collider = Some(handle);
                }
                log::debug!("Spawned {} {id:?} with collider {handle:?}", kind.name());
                Ok(id)
            }
            Err(err) => {
                self.entities.remove(id);
                log::error!("Failed to spawn {}: {err}", kind.name());
                Err(err.into())
            }
        }
    }

    /// Mark an entity for removal at the end of the frame
    pub fn destroy(&mut self, id: EntityId) -> Result<(), SceneError> {
        let entity = self.entities.get_mut(id).ok_or(SceneError::UnknownEntity(id))?;
        entity.lifecycle.mark_pending_destroy();
        Ok(())
    }

    /// Forget last frame's collision notifications
    pub fn begin_frame(&mut self) {
        for entity in self.entities.values_mut() {
            entity.contacts.clear_frame_data();
        }
    }

    /// Remove every pending entity and deregister its collider.
    /// Returns the number of entities removed.
    pub fn cleanup(&mut self, physics: &mut PhysicsManager) -> usize {
        let doomed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.lifecycle.is_pending_destroy())
            .map(|(id, _)| id)
            .collect();

        for &id in &doomed {
            let Some(entity) = self.entities.remove(id) else {
                continue;
            };
            if let Some(handle) = entity.collider {
                if let Err(err) = physics.remove_collider(handle) {
                    log::warn!("Cleanup of {id:?}: {err}");
                }
            }
            log::trace!("Removed {} {id:?}", entity.kind.name());
        }
        doomed.len()
    }
}

impl PhysicsHost for Scene {
    fn world_matrix(&self, entity: EntityId) -> Option<Mat4> {
        self.entities.get(entity).map(|e| e.transform.world_matrix())
    }

    fn inverse_world_matrix(&self, entity: EntityId) -> Option<Mat4> {
        self.entities.get(entity).map(|e| e.transform.inverse_world_matrix())
    }

    fn is_pending_destroy(&self, entity: EntityId) -> bool {
        self.entities
            .get(entity)
            .map_or(true, |e| e.lifecycle.is_pending_destroy())
    }

    fn fixed_update(&mut self, entity: EntityId, dt: f32) {
        if let Some(e) = self.entities.get_mut(entity) {
            let SceneEntity {
                transform,
                movement,
                lifecycle,
                ..
            } = e;
            movement.step(transform, dt);
            lifecycle.update(dt);
        }
    }

    fn on_collision_enter(&mut self, entity: EntityId, other: &Collider) {
        let other_id = other.entity();
        let Some(other_kind) = self.entities.get(other_id).map(|e| e.kind) else {
            return;
        };
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        e.contacts.record_enter(other_id);
        if e.kind.consumed_by(other_kind) {
            log::debug!("{} {entity:?} consumed by {}", e.kind.name(), other_kind.name());
            e.lifecycle.mark_pending_destroy();
        }
    }

    fn on_collision_exit(&mut self, entity: EntityId, other: &Collider) {
        if let Some(e) = self.entities.get_mut(entity) {
            e.contacts.record_exit(other.entity());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::ecs::components::{MovementComponent, TransformComponent};
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (Scene, PhysicsManager) {
        (Scene::new(), PhysicsManager::new(PhysicsConfig::default()).unwrap())
    }

    fn at(kind: EntityKind, x: f32) -> SpawnDesc {
        SpawnDesc::new(kind, TransformComponent::from_position(Vec3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_spawn_bakes_scale_into_collider() {
        let (mut scene, mut physics) = setup();
        let desc = SpawnDesc::new(
            EntityKind::Asteroid,
            TransformComponent::from_position(Vec3::new(5.0, 0.0, 0.0)).with_uniform_scale(2.0),
        );

        let id = scene.spawn(&mut physics, desc).unwrap();
        let handle = scene.get(id).and_then(SceneEntity::collider).unwrap();
        let collider = physics.collider(handle).unwrap();

        assert_eq!(collider.entity(), id);
        assert_relative_eq!(collider.radius(), 2.0);
        assert_relative_eq!(collider.position(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(physics.collider_count(), 1);
    }

    #[test]
    fn test_non_uniform_scale_sets_radius() {
        let (mut scene, mut physics) = setup();
        let desc = SpawnDesc::new(
            EntityKind::Asteroid,
            TransformComponent::identity().with_scale(Vec3::new(1.0, 3.0, 0.5)),
        );

        let id = scene.spawn(&mut physics, desc).unwrap();
        let handle = scene.get(id).and_then(SceneEntity::collider).unwrap();
        let collider = physics.collider(handle).unwrap();

        assert_relative_eq!(collider.radius(), 3.0);
        assert_eq!(collider.level(), Some(3));
    }

    #[test]
    fn test_rejected_spawn_leaves_no_entity() {
        let (mut scene, mut physics) = setup();
        let desc = at(EntityKind::Asteroid, 0.0).with_mesh_extents(
            Vec3::new(-50.0, -1.0, -1.0),
            Vec3::new(50.0, 1.0, 1.0),
        );

        let result = scene.spawn(&mut physics, desc);

        assert!(matches!(
            result,
            Err(SceneError::Physics(PhysicsError::ColliderTooLarge { .. }))
        ));
        assert!(scene.is_empty());
        assert_eq!(physics.collider_count(), 0);
    }

    #[test]
    fn test_projectile_destroys_asteroid() {
        let (mut scene, mut physics) = setup();
        let rock = scene.spawn(&mut physics, at(EntityKind::Asteroid, 0.0)).unwrap();
        let shot = scene
            .spawn(&mut physics, at(EntityKind::Projectile, 1.5))
            .unwrap();

        let stats = physics.step(DT, &mut scene);
        assert_eq!(stats.enter_events, 1);
        assert!(scene.get(rock).unwrap().contacts.just_collided_with(shot));
        assert!(scene.is_pending_destroy(rock));
        assert!(scene.is_pending_destroy(shot));

        assert_eq!(scene.cleanup(&mut physics), 2);
        assert!(scene.is_empty());
        assert_eq!(physics.collider_count(), 0);
        assert!(physics.grid().is_empty());
    }

    #[test]
    fn test_ship_survives_and_collects_pickup() {
        let (mut scene, mut physics) = setup();
        let ship = scene.spawn(&mut physics, at(EntityKind::Ship, 0.0)).unwrap();
        let rock = scene.spawn(&mut physics, at(EntityKind::Asteroid, -1.0)).unwrap();
        let pickup = scene.spawn(&mut physics, at(EntityKind::Pickup, 1.5)).unwrap();

        physics.step(DT, &mut scene);

        let contacts = &scene.get(ship).unwrap().contacts;
        assert!(contacts.just_collided_with(rock));
        assert!(contacts.just_collided_with(pickup));
        assert!(!scene.is_pending_destroy(ship));
        assert!(!scene.is_pending_destroy(rock));
        assert!(scene.is_pending_destroy(pickup));
        assert_eq!(scene.count_of(EntityKind::Pickup), 0);

        scene.cleanup(&mut physics);
        scene.begin_frame();
        assert_eq!(scene.len(), 2);
        assert!(scene.get(ship).unwrap().contacts.collision_entered.is_empty());
        assert_eq!(scene.get(ship).unwrap().contacts.total_enters, 2);
    }

    #[test]
    fn test_lifetime_expiry_removes_projectile() {
        let (mut scene, mut physics) = setup();
        let desc = at(EntityKind::Projectile, 0.0)
            .with_movement(MovementComponent::with_velocity(Vec3::new(30.0, 0.0, 0.0)))
            .with_lifetime(0.05);
        let shot = scene.spawn(&mut physics, desc).unwrap();

        for _ in 0..2 {
            physics.step(DT, &mut scene);
        }
        assert!(!scene.is_pending_destroy(shot));
        assert_relative_eq!(scene.get(shot).unwrap().transform.position.x, 1.0, epsilon = 1e-5);

        for _ in 0..2 {
            physics.step(DT, &mut scene);
        }
        assert!(scene.is_pending_destroy(shot));
        assert_eq!(scene.cleanup(&mut physics), 1);
        assert_eq!(physics.collider_count(), 0);
    }

    #[test]
    fn test_destroy_is_deferred() {
        let (mut scene, mut physics) = setup();
        let rock = scene.spawn(&mut physics, at(EntityKind::Asteroid, 0.0)).unwrap();

        scene.destroy(rock).unwrap();
        assert_eq!(scene.len(), 1);
        assert_eq!(physics.collider_count(), 1);

        scene.cleanup(&mut physics);
        assert!(matches!(scene.destroy(rock), Err(SceneError::UnknownEntity(_))));
        assert!(scene.is_pending_destroy(rock));
    }
}
