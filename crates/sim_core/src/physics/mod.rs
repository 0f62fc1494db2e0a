//! Physics module for broad-phase collision detection
//!
//! Colliders are boxes in their entity's local frame, indexed by a hashed
//! hierarchical grid. The [`PhysicsManager`] advances them at a fixed rate
//! and reports newly overlapping pairs to a [`PhysicsHost`].

pub mod aabb;
pub mod collider;
pub mod collision_pair;
pub mod hgrid;
pub mod physics_manager;


pub use aabb::{overlap, AABB};
pub use collider::{test_colliders_in_local_space, Collider, GridPlacement};
pub use collision_pair::{CollisionPair, CollisionPairSet};
pub use hgrid::{Cell, ColliderArena, HGrid, QueryStats};
pub use physics_manager::{PhysicsError, PhysicsHost, PhysicsManager, StepStats};
