//! Movement component for entities that drift through the field
//!
//! Integrated once per fixed physics step from the entity's fixed-update
//! hook, before its collider bounds are refreshed.

use crate::ecs::components::TransformComponent;
use crate::foundation::math::Vec3;

/// Linear and angular motion of an entity
#[derive(Debug, Clone)]
pub struct MovementComponent {
    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Linear acceleration in units per second squared
    pub acceleration: Vec3,

    /// Angular velocity (scaled axis) in radians per second
    pub angular_velocity: Vec3,

    /// Maximum speed limit (0 = no limit)
    pub max_speed: f32,

    /// Damping factor for velocity (0 = no damping)
    pub linear_damping: f32,

    /// Whether movement is enabled
    pub enabled: bool,
}

impl MovementComponent {
    /// A motionless component
    pub fn new() -> Self {
        Self {
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            max_speed: 0.0,
            linear_damping: 0.0,
            enabled: true,
        }
    }

    /// Create a movement component with initial velocity
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Self::new()
        }
    }

    /// Builder pattern: set angular velocity
    pub fn with_spin(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set maximum speed
    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed.max(0.0);
    }

    /// Set linear damping
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.clamp(0.0, 1.0);
    }

    /// Advance velocity by one step
    pub fn integrate(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.velocity += self.acceleration * delta_time;

        if self.max_speed > 0.0 {
            let speed = self.velocity.magnitude();
            if speed > self.max_speed {
                self.velocity = self.velocity.normalize() * self.max_speed;
            }
        }

        if self.linear_damping > 0.0 {
            self.velocity *= (1.0 - self.linear_damping * delta_time).max(0.0);
        }
    }

    /// Integrate, then move and spin the transform
    pub fn step(&mut self, transform: &mut TransformComponent, delta_time: f32) {
        if !self.enabled {
            return;
        }
        self.integrate(delta_time);
        transform.translate(self.velocity * delta_time);
        transform.rotate_scaled_axis(self.angular_velocity * delta_time);
    }

    /// Stop all movement
    pub fn stop(&mut self) {
        self.velocity = Vec3::zeros();
        self.acceleration = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
    }
}

impl Default for MovementComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integration() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(1.0, 0.0, 0.0));
        movement.acceleration = Vec3::new(0.0, 1.0, 0.0);

        movement.integrate(0.1);

        assert_relative_eq!(movement.velocity, Vec3::new(1.0, 0.1, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_max_speed_limit() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(10.0, 0.0, 0.0));
        movement.set_max_speed(5.0);

        movement.integrate(0.1);

        assert!(movement.velocity.magnitude() <= 5.0 + 1e-5);
    }

    #[test]
    fn test_damping() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(1.0, 0.0, 0.0));
        movement.set_linear_damping(0.5);

        movement.integrate(0.1);

        assert!(movement.velocity.magnitude() < 1.0);
    }

    #[test]
    fn test_step_moves_transform() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(2.0, 0.0, -4.0));
        let mut transform = TransformComponent::identity();

        movement.step(&mut transform, 0.5);

        assert_relative_eq!(transform.position, Vec3::new(1.0, 0.0, -2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_disabled_does_not_move() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(2.0, 0.0, 0.0));
        movement.enabled = false;
        let mut transform = TransformComponent::identity();

        movement.step(&mut transform, 1.0);

        assert_eq!(transform.position, Vec3::zeros());
    }

    #[test]
    fn test_stop() {
        let mut movement = MovementComponent::with_velocity(Vec3::new(1.0, 2.0, 3.0))
            .with_spin(Vec3::new(1.0, 0.0, 0.0));

        movement.stop();

        assert_eq!(movement.velocity, Vec3::zeros());
        assert_eq!(movement.angular_velocity, Vec3::zeros());
    }
}
