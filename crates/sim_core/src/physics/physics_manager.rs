//! Fixed-step physics manager
//!
//! Owns the collider arena and the hierarchical grid. Every fixed step it
//! lets entities move, refreshes collider positions, re-buckets colliders
//! that drifted or changed size, queries the grid for overlapping pairs and
//! diffs them against the previous step to produce edge-triggered
//! collision-enter notifications.

use crate::config::{ConfigError, PhysicsConfig};
use crate::foundation::collections::{ColliderHandle, EntityId};
use crate::foundation::math::Mat4;
use crate::physics::aabb::AABB;
use crate::physics::collider::Collider;
use crate::physics::collision_pair::{CollisionPair, CollisionPairSet};
use crate::physics::hgrid::{ColliderArena, HGrid, QueryStats};

/// Entity side of the physics contract.
///
/// The physics manager only knows entities by [`EntityId`]; whoever owns
/// them (usually the scene) answers transform and lifecycle questions and
/// receives the notifications.
pub trait PhysicsHost {
    /// Current world matrix of the entity, `None` if it no longer exists
    fn world_matrix(&self, entity: EntityId) -> Option<Mat4>;

    /// Inverse of [`PhysicsHost::world_matrix`]
    fn inverse_world_matrix(&self, entity: EntityId) -> Option<Mat4>;

    /// Whether the entity awaits end-of-frame destruction
    fn is_pending_destroy(&self, entity: EntityId) -> bool;

    /// Per-step update hook, run before the entity's collider is refreshed
    fn fixed_update(&mut self, _entity: EntityId, _dt: f32) {}

    /// The entity started overlapping `other`
    fn on_collision_enter(&mut self, entity: EntityId, other: &Collider);

    /// The entity stopped overlapping `other`. Only called when exit
    /// reporting is enabled.
    fn on_collision_exit(&mut self, _entity: EntityId, _other: &Collider) {}
}

/// Physics errors
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// Handle does not name a live collider
    #[error("Invalid collider handle: {0:?}")]
    InvalidCollider(ColliderHandle),

    /// Host has no entity for the collider's owner
    #[error("Host has no entity {0:?}")]
    UnknownEntity(EntityId),

    /// Collider is already in the live set
    #[error("Collider {0:?} is already registered")]
    AlreadyRegistered(ColliderHandle),

    /// Collider cannot fit the coarsest grid level
    #[error("Collider diameter {diameter} exceeds the grid maximum of {max}")]
    ColliderTooLarge {
        /// Requested diameter
        diameter: f32,
        /// Largest diameter the grid supports
        max: f32,
    },

    /// Bounds contain NaN or infinite values
    #[error("Collider bounds are not finite")]
    InvalidBounds,

    /// Rejected configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Counters for one fixed step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Colliders whose entity was updated and position refreshed
    pub colliders_updated: usize,
    /// Colliders removed and reinserted into the grid
    pub rebucketed: usize,
    /// Grid queries issued
    pub queries: usize,
    /// Accumulated grid query counters
    pub grid: QueryStats,
    /// Overlapping pairs found this step
    pub pairs: usize,
    /// Enter notifications dispatched (one per pair)
    pub enter_events: usize,
    /// Exit notifications dispatched (one per pair)
    pub exit_events: usize,
}

/// Broad-phase collision manager driven at a fixed rate
#[derive(Debug)]
pub struct PhysicsManager {
    config: PhysicsConfig,
    grid: HGrid,
    colliders: ColliderArena,
    /// Registered colliders in registration order
    live: Vec<ColliderHandle>,
    current_pairs: CollisionPairSet,
    previous_pairs: CollisionPairSet,
    last_stats: StepStats,
}

impl PhysicsManager {
    /// Create a manager with a validated configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        log::info!(
            "Physics manager: {} grid levels, {} buckets, max collider diameter {}",
            config.grid.levels,
            config.grid.buckets,
            config.grid.max_diameter()
        );
        Ok(Self {
            grid: HGrid::new(config.grid.clone()),
            config,
            colliders: ColliderArena::with_key(),
            live: Vec::new(),
            current_pairs: CollisionPairSet::new(),
            previous_pairs: CollisionPairSet::new(),
            last_stats: StepStats::default(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Broad-phase grid
    pub fn grid(&self) -> &HGrid {
        &self.grid
    }

    /// Look up a collider
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.live.len()
    }

    /// Registered colliders in registration order
    pub fn live_colliders(&self) -> &[ColliderHandle] {
        &self.live
    }

    /// Pairs found by the most recent step
    pub fn current_pairs(&self) -> &CollisionPairSet {
        &self.current_pairs
    }

    /// Counters of the most recent step
    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    fn check_bounds(&self, bounds: &AABB) -> Result<(), PhysicsError> {
        if !bounds.is_finite() {
            return Err(PhysicsError::InvalidBounds);
        }
        let radius = bounds.max_half_extent();
        if self.grid.level_for_radius(radius).is_none() {
            return Err(PhysicsError::ColliderTooLarge {
                diameter: 2.0 * radius,
                max: self.config.grid.max_diameter(),
            });
        }
        Ok(())
    }

    /// Create an unregistered collider for `entity` with local-space bounds
    pub fn create_collider(
        &mut self,
        entity: EntityId,
        local_bounds: AABB,
    ) -> Result<ColliderHandle, PhysicsError> {
        self.check_bounds(&local_bounds)?;
        Ok(self.colliders.insert(Collider::new(entity, local_bounds)))
    }

    /// Register a collider: snapshot its world position and file it in the grid
    pub fn add_collider<H>(&mut self, handle: ColliderHandle, host: &H) -> Result<(), PhysicsError>
    where
        H: PhysicsHost + ?Sized,
    {
        let Some(collider) = self.colliders.get_mut(handle) else {
            log::error!("add_collider: invalid collider handle {handle:?}");
            return Err(PhysicsError::InvalidCollider(handle));
        };
        if collider.is_in_grid() {
            log::error!("add_collider: collider {handle:?} is already registered");
            return Err(PhysicsError::AlreadyRegistered(handle));
        }
        let entity = collider.entity();
        let Some(world) = host.world_matrix(entity) else {
            log::error!("add_collider: host has no entity {entity:?} for collider {handle:?}");
            return Err(PhysicsError::UnknownEntity(entity));
        };
        collider.refresh_world_position(&world);

        self.grid.insert(&mut self.colliders, handle);
        self.live.push(handle);
        Ok(())
    }

    /// Register several colliders, stopping at the first failure
    pub fn add_colliders<H>(&mut self, handles: &[ColliderHandle], host: &H) -> Result<(), PhysicsError>
    where
        H: PhysicsHost + ?Sized,
    {
        handles.iter().try_for_each(|&handle| self.add_collider(handle, host))
    }

    /// Deregister and destroy a collider, returning it
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<Collider, PhysicsError> {
        if !self.colliders.contains_key(handle) {
            log::error!("remove_collider: invalid collider handle {handle:?}");
            return Err(PhysicsError::InvalidCollider(handle));
        }

        self.grid.remove(&mut self.colliders, handle);
        if let Some(index) = self.live.iter().position(|&h| h == handle) {
            self.live.remove(index);
        }
        self.current_pairs.retain(|pair| !pair.contains(handle));
        self.previous_pairs.retain(|pair| !pair.contains(handle));

        self.colliders
            .remove(handle)
            .ok_or(PhysicsError::InvalidCollider(handle))
    }

    /// Remove several colliders, stopping at the first failure
    pub fn remove_colliders(&mut self, handles: &[ColliderHandle]) -> Result<(), PhysicsError> {
        handles
            .iter()
            .try_for_each(|&handle| self.remove_collider(handle).map(|_| ()))
    }

    /// Replace a collider's local bounds (e.g. after the entity was rescaled).
    ///
    /// The grid placement is left alone; the next step sees the size change
    /// and re-buckets.
    pub fn set_collider_bounds(
        &mut self,
        handle: ColliderHandle,
        local_bounds: AABB,
    ) -> Result<(), PhysicsError> {
        self.check_bounds(&local_bounds)?;
        match self.colliders.get_mut(handle) {
            Some(collider) => {
                collider.set_local_bounds(local_bounds);
                Ok(())
            }
            None => {
                log::error!("set_collider_bounds: invalid collider handle {handle:?}");
                Err(PhysicsError::InvalidCollider(handle))
            }
        }
    }

    /// Advance physics by one fixed step of `dt` seconds
    pub fn step<H>(&mut self, dt: f32, host: &mut H) -> StepStats
    where
        H: PhysicsHost + ?Sized,
    {
        let mut stats = StepStats::default();

        // This step's pairs replace the previous step's
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        // Update phase
        for &handle in &self.live {
            let Some(entity) = self.colliders.get(handle).map(Collider::entity) else {
                continue;
            };
            if host.is_pending_destroy(entity) {
                continue;
            }
            host.fixed_update(entity, dt);

            let Some(world) = host.world_matrix(entity) else {
                continue;
            };
            let Some(collider) = self.colliders.get_mut(handle) else {
                continue;
            };
            collider.refresh_world_position(&world);
            stats.colliders_updated += 1;

            if collider.needs_rebucket(self.config.rebucket_epsilon) {
                let from = collider.placement().map(|p| (p.level, p.bucket));
                self.grid.remove(&mut self.colliders, handle);
                self.grid.insert(&mut self.colliders, handle);
                stats.rebucketed += 1;
                log::trace!(
                    "Re-bucketed {handle:?}: {from:?} -> {:?}",
                    self.colliders
                        .get(handle)
                        .and_then(|c| c.placement())
                        .map(|p| (p.level, p.bucket))
                );
            }
        }

        // Query phase
        for &handle in &self.live {
            let Some(entity) = self.colliders.get(handle).map(Collider::entity) else {
                continue;
            };
            if host.is_pending_destroy(entity) {
                continue;
            }
            let Some(inverse_world) = host.inverse_world_matrix(entity) else {
                continue;
            };

            let host_view: &H = host;
            stats.grid += self.grid.check_against_grid(
                &self.colliders,
                handle,
                &inverse_world,
                |other| host_view.is_pending_destroy(other.entity()),
                &mut self.current_pairs,
            );
            stats.queries += 1;
        }
        stats.pairs = self.current_pairs.len();

        // Pairs that appeared this step
        let mut entered: Vec<CollisionPair> = self
            .current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect();
        entered.sort_unstable();
        for pair in entered {
            if self.dispatch(pair, host, |host, entity, other| host.on_collision_enter(entity, other)) {
                stats.enter_events += 1;
            }
        }

        if self.config.report_exit_events {
            let mut exited: Vec<CollisionPair> = self
                .previous_pairs
                .difference(&self.current_pairs)
                .copied()
                .collect();
            exited.sort_unstable();
            for pair in exited {
                if self.dispatch(pair, host, |host, entity, other| host.on_collision_exit(entity, other)) {
                    stats.exit_events += 1;
                }
            }
        }

        log::trace!("Physics step: {stats:?}");
        self.last_stats = stats;
        stats
    }

    /// Notify both sides of `pair`, unless either is gone or pending destroy
    fn dispatch<H, F>(&self, pair: CollisionPair, host: &mut H, mut notify: F) -> bool
    where
        H: PhysicsHost + ?Sized,
        F: FnMut(&mut H, EntityId, &Collider),
    {
        let (Some(first), Some(second)) = (
            self.colliders.get(pair.first()),
            self.colliders.get(pair.second()),
        ) else {
            return false;
        };
        if host.is_pending_destroy(first.entity()) || host.is_pending_destroy(second.entity()) {
            return false;
        }
        notify(&mut *host, first.entity(), second);
        notify(&mut *host, second.entity(), first);
        true
    }
}
