//! Asteroid Field Demo
//!
//! Headless run of the simulation core:
//! - A field of drifting, spinning asteroids of mixed sizes
//! - A ship at the center firing projectiles in random directions
//! - Pickups scattered around the field
//! - Entities leaving the field wrap around to the opposite side
//!
//! Frames run at a jittery wall-clock rate while physics advances in fixed
//! steps. Collision statistics are logged once per second.
//!
//! Usage: `asteroid_field [physics_config.toml|physics_config.ron]`

use rand::Rng;
use sim_core::foundation::logging;
use sim_core::prelude::*;
use std::time::Duration;

// Field settings
const FIELD_HALF_SIZE: f32 = 120.0;
const RUN_SECONDS: f32 = 10.0;
const REPORT_INTERVAL: f32 = 1.0;

// Entity counts
const NUM_ASTEROIDS: usize = 150;
const NUM_PICKUPS: usize = 12;

// Movement and sizes
const ASTEROID_SPEED: f32 = 6.0;
const ASTEROID_MIN_SCALE: f32 = 0.5;
const ASTEROID_MAX_SCALE: f32 = 6.0;
const PROJECTILE_SPEED: f32 = 80.0;
const PROJECTILE_SCALE: f32 = 0.25;
const PROJECTILE_LIFETIME: f32 = 1.5;
const FIRE_INTERVAL: f32 = 0.2;
const MUZZLE_OFFSET: f32 = 3.0;

#[derive(thiserror::Error, Debug)]
enum FieldError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

#[derive(Debug, Default)]
struct Totals {
    steps: u64,
    contacts: usize,
    removed: usize,
    shots: usize,
    hull_hits: usize,
}

struct AsteroidField {
    sim: Simulation,
    ship: EntityId,
    fire_cooldown: f32,
    report_timer: f32,
    totals: Totals,
}

fn random_direction(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    )
    .try_normalize(1.0e-6)
    .unwrap_or_else(Vec3::x)
}

fn random_position(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-FIELD_HALF_SIZE..FIELD_HALF_SIZE),
        rng.gen_range(-FIELD_HALF_SIZE..FIELD_HALF_SIZE),
        rng.gen_range(-FIELD_HALF_SIZE..FIELD_HALF_SIZE),
    )
}

fn wrap_coordinate(value: f32) -> f32 {
    if value > FIELD_HALF_SIZE {
        value - 2.0 * FIELD_HALF_SIZE
    } else if value < -FIELD_HALF_SIZE {
        value + 2.0 * FIELD_HALF_SIZE
    } else {
        value
    }
}

impl AsteroidField {
    fn new(config: PhysicsConfig, rng: &mut impl Rng) -> Result<Self, FieldError> {
        let mut sim = Simulation::new(config)?;

        let ship = sim.scene.spawn(
            &mut sim.physics,
            SpawnDesc::new(EntityKind::Ship, TransformComponent::identity())
                .with_movement(MovementComponent::new().with_spin(Vec3::new(0.0, 0.5, 0.0))),
        )?;

        let mut field = Self {
            sim,
            ship,
            fire_cooldown: 0.0,
            report_timer: 0.0,
            totals: Totals::default(),
        };
        for _ in 0..NUM_ASTEROIDS {
            field.spawn_asteroid(rng)?;
        }
        for _ in 0..NUM_PICKUPS {
            field.spawn_pickup(rng)?;
        }

        log::info!(
            "Asteroid field ready: {} entities, {} colliders",
            field.sim.scene.len(),
            field.sim.physics.collider_count()
        );
        Ok(field)
    }

    fn spawn_asteroid(&mut self, rng: &mut impl Rng) -> Result<EntityId, FieldError> {
        let scale = rng.gen_range(ASTEROID_MIN_SCALE..ASTEROID_MAX_SCALE);
        let transform = TransformComponent::from_position(random_position(rng))
            .with_rotation_axis_angle(random_direction(rng), rng.gen_range(0.0..std::f32::consts::TAU))
            .with_uniform_scale(scale);
        let movement = MovementComponent::with_velocity(random_direction(rng) * ASTEROID_SPEED / scale)
            .with_spin(random_direction(rng) * rng.gen_range(0.1..1.5));

        let id = self.sim.scene.spawn(
            &mut self.sim.physics,
            SpawnDesc::new(EntityKind::Asteroid, transform).with_movement(movement),
        )?;
        Ok(id)
    }

    fn spawn_pickup(&mut self, rng: &mut impl Rng) -> Result<EntityId, FieldError> {
        let transform = TransformComponent::from_position(random_position(rng)).with_uniform_scale(0.5);
        let id = self
            .sim
            .scene
            .spawn(&mut self.sim.physics, SpawnDesc::new(EntityKind::Pickup, transform))?;
        Ok(id)
    }

    fn fire(&mut self, rng: &mut impl Rng) -> Result<(), FieldError> {
        let Some(ship) = self.sim.scene.get(self.ship) else {
            return Ok(());
        };
        let direction = random_direction(rng);
        let transform = TransformComponent::from_position(ship.transform.position + direction * MUZZLE_OFFSET)
            .with_uniform_scale(PROJECTILE_SCALE);

        self.sim.scene.spawn(
            &mut self.sim.physics,
            SpawnDesc::new(EntityKind::Projectile, transform)
                .with_movement(MovementComponent::with_velocity(direction * PROJECTILE_SPEED))
                .with_lifetime(PROJECTILE_LIFETIME),
        )?;
        self.totals.shots += 1;
        Ok(())
    }

    /// Teleport entities that left the field to the opposite side
    fn wrap_positions(&mut self) {
        let outside: Vec<EntityId> = self
            .sim
            .scene
            .iter()
            .filter(|(_, e)| e.transform.position.abs().max() > FIELD_HALF_SIZE)
            .map(|(id, _)| id)
            .collect();

        for id in outside {
            if let Some(entity) = self.sim.scene.get_mut(id) {
                let p = &mut entity.transform.position;
                *p = Vec3::new(wrap_coordinate(p.x), wrap_coordinate(p.y), wrap_coordinate(p.z));
            }
        }
    }

    fn frame(&mut self, frame_time: f32, rng: &mut impl Rng) -> Result<(), FieldError> {
        self.fire_cooldown -= frame_time;
        while self.fire_cooldown <= 0.0 {
            self.fire(rng)?;
            self.fire_cooldown += FIRE_INTERVAL;
        }

        let report = self.sim.advance(frame_time);
        self.totals.steps += u64::from(report.steps);
        self.totals.contacts += report.enter_events;
        self.totals.removed += report.removed;
        if let Some(ship) = self.sim.scene.get(self.ship) {
            self.totals.hull_hits += ship.contacts.collision_entered.len();
        }

        self.wrap_positions();

        // Keep the field populated
        while self.sim.scene.count_of(EntityKind::Asteroid) < NUM_ASTEROIDS {
            self.spawn_asteroid(rng)?;
        }
        while self.sim.scene.count_of(EntityKind::Pickup) < NUM_PICKUPS {
            self.spawn_pickup(rng)?;
        }

        self.report_timer += frame_time;
        if self.report_timer >= REPORT_INTERVAL {
            self.report_timer -= REPORT_INTERVAL;
            self.log_report(&report);
        }
        Ok(())
    }

    fn log_report(&self, report: &FrameReport) {
        let grid = self.sim.physics.grid();
        let levels: Vec<usize> = (0..grid.config().levels)
            .map(|level| grid.objects_at_level(level))
            .collect();
        log::info!(
            "steps {} | contacts {} | removed {} | colliders {} | per level {:?}",
            self.totals.steps,
            self.totals.contacts,
            self.totals.removed,
            self.sim.physics.collider_count(),
            levels
        );
        if let Some(step) = report.last_step {
            log::debug!(
                "last step: {} queries, {} buckets, {} candidates, {} pairs, {} re-bucketed",
                step.queries,
                step.grid.buckets_visited,
                step.grid.candidates_tested,
                step.pairs,
                step.rebucketed
            );
        }
    }
}

fn main() -> Result<(), FieldError> {
    logging::init("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {path}");
            PhysicsConfig::load_from_file(&path)?
        }
        None => PhysicsConfig::default(),
    };

    let mut rng = rand::thread_rng();
    let mut field = AsteroidField::new(config, &mut rng)?;
    let mut timer = Timer::new();

    while timer.total_time() < RUN_SECONDS {
        std::thread::sleep(Duration::from_millis(rng.gen_range(8..24)));
        timer.update();
        field.frame(timer.delta_time(), &mut rng)?;
    }

    log::info!(
        "Done after {} frames: {} fixed steps, {} shots, {} contacts, {} hull hits, {} entities removed",
        timer.frame_count(),
        field.totals.steps,
        field.totals.shots,
        field.totals.contacts,
        field.totals.hull_hits,
        field.totals.removed
    );
    Ok(())
}
