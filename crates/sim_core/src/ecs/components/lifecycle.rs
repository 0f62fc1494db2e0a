//! Lifecycle component for deferred destruction
//!
//! Destruction is two-phase: an entity is first marked pending-destroy
//! (physics silently skips it from then on) and only removed by the scene's
//! end-of-frame cleanup.

/// Current state of an entity's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Entity is live and simulated
    Active,
    /// Entity is marked for removal at the end of the frame
    PendingDestroy,
}

/// Component tracking age, optional lifetime and destruction state
#[derive(Debug, Clone)]
pub struct LifecycleComponent {
    /// Seconds of simulation time since spawn
    pub age: f32,

    /// How long the entity lives (None = permanent)
    pub lifetime: Option<f32>,

    /// Current state of the entity
    pub state: EntityState,
}

impl LifecycleComponent {
    /// Create a permanent entity (no automatic destruction)
    pub fn permanent() -> Self {
        Self {
            age: 0.0,
            lifetime: None,
            state: EntityState::Active,
        }
    }

    /// Create an entity that expires after `lifetime` seconds
    pub fn with_lifetime(lifetime: f32) -> Self {
        Self {
            lifetime: Some(lifetime),
            ..Self::permanent()
        }
    }

    /// Age the entity by one step, expiring it when its lifetime runs out
    pub fn update(&mut self, delta_time: f32) {
        self.age += delta_time;
        if let Some(lifetime) = self.lifetime {
            if self.age >= lifetime {
                self.mark_pending_destroy();
            }
        }
    }

    /// Request destruction at the end of the frame
    pub fn mark_pending_destroy(&mut self) {
        self.state = EntityState::PendingDestroy;
    }

    /// Whether the entity is waiting for end-of-frame removal
    pub fn is_pending_destroy(&self) -> bool {
        self.state == EntityState::PendingDestroy
    }
}

impl Default for LifecycleComponent {
    fn default() -> Self {
        Self::permanent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_never_expires() {
        let mut lifecycle = LifecycleComponent::permanent();
        lifecycle.update(1_000.0);
        assert!(!lifecycle.is_pending_destroy());
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut lifecycle = LifecycleComponent::with_lifetime(1.0);

        lifecycle.update(0.6);
        assert!(!lifecycle.is_pending_destroy());

        lifecycle.update(0.6);
        assert!(lifecycle.is_pending_destroy());
    }

    #[test]
    fn test_manual_destroy() {
        let mut lifecycle = LifecycleComponent::permanent();
        lifecycle.mark_pending_destroy();
        assert_eq!(lifecycle.state, EntityState::PendingDestroy);
    }
}
