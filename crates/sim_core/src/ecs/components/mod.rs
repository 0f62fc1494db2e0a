//! ECS Components module
//!
//! Data the scene keeps for every entity taking part in the simulation

pub mod transform;
pub mod movement;
pub mod lifecycle;
pub mod collision;

pub use transform::TransformComponent;
pub use movement::MovementComponent;
pub use lifecycle::{LifecycleComponent, EntityState};
pub use collision::CollisionStateComponent;
