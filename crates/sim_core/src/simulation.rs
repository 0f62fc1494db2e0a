//! Frame driver
//!
//! Converts variable frame time into whole fixed physics steps, then runs
//! end-of-frame cleanup so entities destroyed during the steps leave the
//! scene and the grid together.

use crate::config::PhysicsConfig;
use crate::foundation::time::FixedTimestep;
use crate::physics::{PhysicsError, PhysicsManager, StepStats};
use crate::scene::Scene;

/// What one rendered frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Fixed steps run this frame
    pub steps: u32,
    /// Enter events across all steps
    pub enter_events: usize,
    /// Exit events across all steps
    pub exit_events: usize,
    /// Entities removed by cleanup
    pub removed: usize,
    /// Counters of the last step run, if any
    pub last_step: Option<StepStats>,
}

/// Scene, physics and accumulator advanced together
#[derive(Debug)]
pub struct Simulation {
    /// Entity table
    pub scene: Scene,
    /// Physics manager
    pub physics: PhysicsManager,
    timestep: FixedTimestep,
}

impl Simulation {
    /// Build an empty simulation
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        let timestep = FixedTimestep::new(config.fixed_timestep, config.max_steps_per_frame);
        Ok(Self {
            scene: Scene::new(),
            physics: PhysicsManager::new(config)?,
            timestep,
        })
    }

    /// Fixed-step accumulator
    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Advance by one rendered frame of `frame_time` seconds
    pub fn advance(&mut self, frame_time: f32) -> FrameReport {
        let mut report = FrameReport::default();
        self.scene.begin_frame();

        report.steps = self.timestep.accumulate(frame_time);
        let dt = self.timestep.step();
        for _ in 0..report.steps {
            let stats = self.physics.step(dt, &mut self.scene);
            report.enter_events += stats.enter_events;
            report.exit_events += stats.exit_events;
            report.last_step = Some(stats);
        }

        report.removed = self.scene.cleanup(&mut self.physics);
        report
    }
}
