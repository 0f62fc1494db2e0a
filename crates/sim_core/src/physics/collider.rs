//! Colliders and the local-space overlap test
//!
//! A collider keeps its box in the owning entity's local frame (mesh
//! extents times local scale, fixed at construction) and a world-space
//! snapshot of the box center that the physics manager refreshes every
//! step. The grid threads colliders of one bucket into a doubly linked list
//! through the `prev`/`next` handles.

use crate::foundation::collections::{ColliderHandle, EntityId};
use crate::foundation::math::{utils::transform_position, Mat4, Vec3};
use crate::physics::aabb::{overlap, AABB};

/// Where a collider was filed the last time it went into the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlacement {
    /// Grid level
    pub level: usize,
    /// Hash bucket
    pub bucket: usize,
    /// World-space center at insertion
    pub position: Vec3,
    /// Bounding radius at insertion
    pub radius: f32,
}

/// Broad-phase proxy of one entity
#[derive(Debug, Clone)]
pub struct Collider {
    entity: EntityId,
    local_bounds: AABB,
    position: Vec3,
    placement: Option<GridPlacement>,
    pub(crate) prev: Option<ColliderHandle>,
    pub(crate) next: Option<ColliderHandle>,
}

impl Collider {
    /// Create an unregistered collider for `entity`
    pub fn new(entity: EntityId, local_bounds: AABB) -> Self {
        Self {
            entity,
            position: local_bounds.center,
            local_bounds,
            placement: None,
            prev: None,
            next: None,
        }
    }

    /// Owning entity (weak handle)
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Box in the owning entity's local frame
    pub fn local_bounds(&self) -> &AABB {
        &self.local_bounds
    }

    pub(crate) fn set_local_bounds(&mut self, local_bounds: AABB) {
        self.local_bounds = local_bounds;
    }

    /// World-space center snapshot from the last refresh
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Conservative bounding radius
    pub fn radius(&self) -> f32 {
        self.local_bounds.max_half_extent()
    }

    /// Grid level, if the collider is filed in the grid
    pub fn level(&self) -> Option<usize> {
        self.placement.map(|p| p.level)
    }

    /// Hash bucket, if the collider is filed in the grid
    pub fn bucket(&self) -> Option<usize> {
        self.placement.map(|p| p.bucket)
    }

    /// Full record of the current grid placement
    pub fn placement(&self) -> Option<&GridPlacement> {
        self.placement.as_ref()
    }

    /// Whether the collider currently sits in a grid bucket
    pub fn is_in_grid(&self) -> bool {
        self.placement.is_some()
    }

    pub(crate) fn set_placement(&mut self, placement: Option<GridPlacement>) {
        self.placement = placement;
    }

    /// Re-derive the world-space center from the entity's world matrix
    pub fn refresh_world_position(&mut self, world_matrix: &Mat4) {
        self.position = transform_position(world_matrix, &self.local_bounds.center);
    }

    /// Whether the collider drifted or resized past `epsilon` since it was
    /// filed. Colliders outside the grid always need (re)insertion.
    pub fn needs_rebucket(&self, epsilon: f32) -> bool {
        match &self.placement {
            Some(placement) => {
                (self.position - placement.position).norm() > epsilon
                    || (self.radius() - placement.radius).abs() > epsilon
            }
            None => true,
        }
    }
}

/// Overlap test performed in `a`'s local frame.
///
/// `a` keeps its local box; `b`'s world-space center is carried into `a`'s
/// frame through `a_inverse_world` and tested with `b`'s own extents. This
/// avoids rebuilding world-space boxes for every query.
pub fn test_colliders_in_local_space(a: &Collider, a_inverse_world: &Mat4, b: &Collider) -> bool {
    let b_local_center = transform_position(a_inverse_world, &b.position);
    let b_local = b.local_bounds.with_center(b_local_center);
    overlap(&a.local_bounds, &b_local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::foundation::collections::HandleMap;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn entity_ids(count: usize) -> Vec<EntityId> {
        let mut map: HandleMap<EntityId, ()> = HandleMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn placed(entity: EntityId, bounds: AABB, transform: &TransformComponent) -> Collider {
        let mut collider = Collider::new(entity, bounds);
        collider.refresh_world_position(&transform.world_matrix());
        collider
    }

    #[test]
    fn test_world_position_follows_transform() {
        let ids = entity_ids(1);
        let bounds = AABB::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let transform = TransformComponent::from_position(Vec3::new(5.0, 0.0, -3.0));

        let collider = placed(ids[0], bounds, &transform);

        assert_relative_eq!(collider.position(), Vec3::new(5.0, 1.0, -3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_local_space_overlap() {
        let ids = entity_ids(2);
        let bounds = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let ta = TransformComponent::from_position(Vec3::new(10.0, 0.0, 0.0));
        let tb = TransformComponent::from_position(Vec3::new(11.5, 0.0, 0.0));

        let a = placed(ids[0], bounds, &ta);
        let b = placed(ids[1], bounds, &tb);

        assert!(test_colliders_in_local_space(&a, &ta.inverse_world_matrix(), &b));
        assert!(test_colliders_in_local_space(&b, &tb.inverse_world_matrix(), &a));
    }

    #[test]
    fn test_local_space_respects_rotation() {
        let ids = entity_ids(2);
        // Long thin box along local X
        let long = AABB::new(Vec3::zeros(), Vec3::new(5.0, 0.5, 0.5));
        let small = AABB::new(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5));

        let ta = TransformComponent::identity();
        let tb = TransformComponent::from_position(Vec3::new(0.0, 0.0, -4.0));
        let b = placed(ids[1], small, &tb);

        let unrotated = placed(ids[0], long, &ta);
        assert!(!test_colliders_in_local_space(&unrotated, &ta.inverse_world_matrix(), &b));

        // Swing the long axis onto world -Z so it reaches b
        let rotated_transform = ta.with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2));
        let rotated = placed(ids[0], long, &rotated_transform);
        assert!(test_colliders_in_local_space(
            &rotated,
            &rotated_transform.inverse_world_matrix(),
            &b
        ));
    }

    #[test]
    fn test_needs_rebucket() {
        let ids = entity_ids(1);
        let mut collider = Collider::new(ids[0], AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
        assert!(collider.needs_rebucket(0.01));

        collider.set_placement(Some(GridPlacement {
            level: 1,
            bucket: 7,
            position: collider.position(),
            radius: collider.radius(),
        }));
        assert!(!collider.needs_rebucket(0.01));

        collider.refresh_world_position(&Mat4::new_translation(&Vec3::new(0.005, 0.0, 0.0)));
        assert!(!collider.needs_rebucket(0.01));

        collider.refresh_world_position(&Mat4::new_translation(&Vec3::new(0.5, 0.0, 0.0)));
        assert!(collider.needs_rebucket(0.01));
    }

    #[test]
    fn test_resize_needs_rebucket() {
        let ids = entity_ids(1);
        let mut collider = Collider::new(ids[0], AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
        collider.set_placement(Some(GridPlacement {
            level: 1,
            bucket: 0,
            position: collider.position(),
            radius: collider.radius(),
        }));

        collider.set_local_bounds(AABB::new(Vec3::zeros(), Vec3::new(3.0, 1.0, 1.0)));
        assert!(collider.needs_rebucket(0.01));
    }
}
