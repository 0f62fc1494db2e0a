//! Configuration system
//!
//! Every tunable of the physics core lives in [`PhysicsConfig`], constructed
//! explicitly and handed to the physics manager. Defaults carry the
//! reference constants; files in `.toml` or `.ron` can override them.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its legal range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Largest level count the `u32` occupancy mask can describe
pub const MAX_GRID_LEVELS: usize = 32;

/// Hierarchical grid layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HGridConfig {
    /// Number of discretization levels
    pub levels: usize,
    /// Number of hash buckets shared by all levels
    pub buckets: usize,
    /// Cell size of level 0
    pub min_cell_size: f32,
    /// A collider fits a level when `cell_size * ratio >= diameter`
    pub sphere_to_cell_ratio: f32,
    /// Growth factor between consecutive levels
    pub cell_to_cell_ratio: f32,
}

impl Default for HGridConfig {
    fn default() -> Self {
        Self {
            levels: 6,
            buckets: 1024,
            min_cell_size: 4.0,
            sphere_to_cell_ratio: 0.25,
            cell_to_cell_ratio: 2.0,
        }
    }
}

impl HGridConfig {
    /// Cell size of the given level
    pub fn cell_size(&self, level: usize) -> f32 {
        (0..level).fold(self.min_cell_size, |size, _| size * self.cell_to_cell_ratio)
    }

    /// Largest collider diameter the coarsest level can hold
    pub fn max_diameter(&self) -> f32 {
        self.cell_size(self.levels.saturating_sub(1)) * self.sphere_to_cell_ratio
    }

    /// Check that the layout is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels == 0 || self.levels > MAX_GRID_LEVELS {
            return Err(ConfigError::Invalid(format!(
                "grid levels must be in 1..={MAX_GRID_LEVELS}, got {}",
                self.levels
            )));
        }
        if self.buckets == 0 || i32::try_from(self.buckets).is_err() {
            return Err(ConfigError::Invalid(format!(
                "bucket count must be positive and fit in i32, got {}",
                self.buckets
            )));
        }
        if !(self.min_cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_cell_size must be positive, got {}",
                self.min_cell_size
            )));
        }
        if !(self.sphere_to_cell_ratio > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sphere_to_cell_ratio must be positive, got {}",
                self.sphere_to_cell_ratio
            )));
        }
        if !(self.cell_to_cell_ratio > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_to_cell_ratio must exceed 1, got {}",
                self.cell_to_cell_ratio
            )));
        }
        Ok(())
    }
}

/// Physics step configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Grid layout
    pub grid: HGridConfig,
    /// Movement or resize beyond this distance re-buckets a collider
    pub rebucket_epsilon: f32,
    /// Fixed physics step length in seconds
    pub fixed_timestep: f32,
    /// Upper bound on physics steps run for one rendered frame
    pub max_steps_per_frame: u32,
    /// Also report pairs that stopped overlapping
    pub report_exit_events: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            grid: HGridConfig::default(),
            rebucket_epsilon: 0.01,
            fixed_timestep: 1.0 / 60.0,
            max_steps_per_frame: 8,
            report_exit_events: false,
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        if !(self.rebucket_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rebucket_epsilon must be non-negative, got {}",
                self.rebucket_epsilon
            )));
        }
        if !(self.fixed_timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid("max_steps_per_frame must be at least 1".into()));
        }
        Ok(())
    }
}
