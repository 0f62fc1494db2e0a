//! Unordered collider pairs
//!
//! A pair stores its two handles in ascending order, so `(a, b)` and
//! `(b, a)` compare and hash identically.

use crate::foundation::collections::ColliderHandle;
use std::collections::HashSet;

/// Symmetric pair of colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    first: ColliderHandle,
    second: ColliderHandle,
}

impl CollisionPair {
    /// Create a pair; argument order does not matter
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Smaller handle
    pub fn first(&self) -> ColliderHandle {
        self.first
    }

    /// Larger handle
    pub fn second(&self) -> ColliderHandle {
        self.second
    }

    /// Whether `handle` is one side of the pair
    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.first == handle || self.second == handle
    }

    /// The side that is not `handle`
    pub fn other(&self, handle: ColliderHandle) -> Option<ColliderHandle> {
        if self.first == handle {
            Some(self.second)
        } else if self.second == handle {
            Some(self.first)
        } else {
            None
        }
    }
}

/// One step's worth of overlapping pairs
pub type CollisionPairSet = HashSet<CollisionPair>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::HandleMap;

    fn handles(count: usize) -> Vec<ColliderHandle> {
        let mut map: HandleMap<ColliderHandle, ()> = HandleMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_pair_is_symmetric() {
        let h = handles(2);
        assert_eq!(CollisionPair::new(h[0], h[1]), CollisionPair::new(h[1], h[0]));
    }

    #[test]
    fn test_set_membership_is_symmetric() {
        let h = handles(3);
        let mut set = CollisionPairSet::new();
        set.insert(CollisionPair::new(h[0], h[1]));

        assert!(set.contains(&CollisionPair::new(h[1], h[0])));
        assert!(!set.contains(&CollisionPair::new(h[0], h[2])));

        set.insert(CollisionPair::new(h[1], h[0]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_other_side() {
        let h = handles(3);
        let pair = CollisionPair::new(h[2], h[0]);

        assert_eq!(pair.other(h[0]), Some(h[2]));
        assert_eq!(pair.other(h[2]), Some(h[0]));
        assert_eq!(pair.other(h[1]), None);
        assert!(pair.contains(h[2]));
        assert!(!pair.contains(h[1]));
    }
}
