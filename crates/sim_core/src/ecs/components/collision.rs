//! Collision state component
//!
//! Records what the physics manager reported to an entity: the entities it
//! started touching, and, when exit reporting is enabled, the ones it
//! stopped touching.

use crate::foundation::collections::EntityId;

/// Per-entity record of collision notifications
#[derive(Debug, Default, Clone)]
pub struct CollisionStateComponent {
    /// Entities that entered collision with us since the last frame reset
    pub collision_entered: Vec<EntityId>,

    /// Entities that left collision with us since the last frame reset
    pub collision_exited: Vec<EntityId>,

    /// Enter notifications received over the entity's whole life
    pub total_enters: u64,
}

impl CollisionStateComponent {
    /// Record an enter notification
    pub fn record_enter(&mut self, other: EntityId) {
        self.collision_entered.push(other);
        self.total_enters += 1;
    }

    /// Record an exit notification
    pub fn record_exit(&mut self, other: EntityId) {
        self.collision_exited.push(other);
    }

    /// Check if we just started colliding with a specific entity
    pub fn just_collided_with(&self, entity: EntityId) -> bool {
        self.collision_entered.contains(&entity)
    }

    /// Check if we just stopped colliding with a specific entity
    pub fn just_stopped_colliding_with(&self, entity: EntityId) -> bool {
        self.collision_exited.contains(&entity)
    }

    /// Clear per-frame data
    pub(crate) fn clear_frame_data(&mut self) {
        self.collision_entered.clear();
        self.collision_exited.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::HandleMap;

    #[test]
    fn test_records_and_clears() {
        let mut ids: HandleMap<EntityId, ()> = HandleMap::with_key();
        let other = ids.insert(());

        let mut state = CollisionStateComponent::default();
        state.record_enter(other);
        state.record_exit(other);

        assert!(state.just_collided_with(other));
        assert!(state.just_stopped_colliding_with(other));

        state.clear_frame_data();
        assert!(!state.just_collided_with(other));
        assert_eq!(state.total_enters, 1);
    }
}
