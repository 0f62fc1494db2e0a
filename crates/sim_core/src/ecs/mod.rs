//! Entity components
//!
//! Plain data components stored per entity by the scene. Entities are
//! addressed by [`EntityId`] handles.

pub mod components;

pub use crate::foundation::collections::EntityId;
