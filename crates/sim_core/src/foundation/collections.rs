//! Handle types backed by slot maps
//!
//! Colliders and entities live in generational arenas so that a handle to a
//! removed object becomes a failed lookup instead of a dangling reference.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a collider owned by the physics manager
    pub struct ColliderHandle;

    /// Weak handle to an entity in the scene's entity table
    pub struct EntityId;
}

/// Arena of values addressed by a typed handle
pub type HandleMap<K, T> = SlotMap<K, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_handle_is_stale() {
        let mut map: HandleMap<EntityId, u32> = HandleMap::with_key();
        let first = map.insert(1);
        map.remove(first);
        let second = map.insert(2);

        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&2));
        assert_ne!(first, second);
    }
}
