//! # Sim Core
//!
//! Simulation core of a 3D space shooter: broad-phase collision detection
//! over a hashed hierarchical grid, driven by a fixed-timestep physics loop
//! with edge-triggered collision notifications.
//!
//! ## Features
//!
//! - **Hierarchical grid**: multi-resolution spatial hash for colliders of
//!   very different sizes
//! - **Local-space overlap test**: boxes compared in the querying entity's
//!   own frame
//! - **Edge-triggered events**: collision enter fires once per contact,
//!   exit on request
//! - **Fixed timestep**: physics advances in uniform steps regardless of
//!   frame rate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sim_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sim = Simulation::new(PhysicsConfig::default())?;
//!     sim.scene.spawn(
//!         &mut sim.physics,
//!         SpawnDesc::new(EntityKind::Asteroid, TransformComponent::identity()),
//!     )?;
//!
//!     let report = sim.advance(1.0 / 60.0);
//!     println!("{} steps, {} contacts", report.steps, report.enter_events);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod ecs;
pub mod physics;
pub mod scene;
pub mod simulation;

pub use simulation::{FrameReport, Simulation};

/// Common imports for users of the core
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, HGridConfig, PhysicsConfig},
        ecs::components::{
            CollisionStateComponent, LifecycleComponent, MovementComponent, TransformComponent,
        },
        foundation::{
            collections::{ColliderHandle, EntityId},
            math::{Mat4, Quat, Vec3},
            time::{FixedTimestep, Timer},
        },
        physics::{
            Collider, CollisionPair, HGrid, PhysicsError, PhysicsHost, PhysicsManager, StepStats,
            AABB,
        },
        scene::{EntityKind, Scene, SceneEntity, SceneError, SpawnDesc},
        FrameReport, Simulation,
    };
}
