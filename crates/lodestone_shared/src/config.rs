use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::{ChunkDims, DimsError};
use crate::terrain::{LayerError, TerrainLayers};

pub const DEFAULT_WORLD_SEED: u64 = 0x5EED_C0DE;

fn default_world_dimensions() -> IVec3 {
    IVec3::new(3, 3, 3)
}

fn default_chunk_dimensions() -> IVec3 {
    IVec3::new(10, 10, 10)
}

fn default_column_radius() -> i32 {
    3
}

fn default_update_interval() -> f32 {
    0.5
}

fn default_spawn_drop_height() -> f32 {
    5.0
}

fn default_seed() -> u64 {
    DEFAULT_WORLD_SEED
}

/// World and chunk sizing plus the terrain layer stack, loaded once at
/// startup. `world_dimensions` counts chunks per axis; `chunk_dimensions`
/// counts blocks per chunk axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_dimensions")]
    pub world_dimensions: IVec3,
    #[serde(default = "default_chunk_dimensions")]
    pub chunk_dimensions: IVec3,
    /// How many column steps outward to generate around the observer.
    #[serde(default = "default_column_radius")]
    pub column_radius: i32,
    /// Minimum wall-clock spacing between streaming update checks.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: f32,
    /// Height above the sampled surface at which the observer spawns.
    #[serde(default = "default_spawn_drop_height")]
    pub spawn_drop_height: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub layers: TerrainLayers,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_dimensions: default_world_dimensions(),
            chunk_dimensions: default_chunk_dimensions(),
            column_radius: default_column_radius(),
            update_interval_secs: default_update_interval(),
            spawn_drop_height: default_spawn_drop_height(),
            seed: default_seed(),
            layers: TerrainLayers::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    WorldDimensionTooSmall { axis: &'static str, value: i32 },
    ChunkDims(DimsError),
    RadiusTooSmall { value: i32 },
    InvalidUpdateInterval { value: f32 },
    Layer(LayerError),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorldDimensionTooSmall { axis, value } => {
                write!(f, "world dimension '{axis}' must be at least 1, got {value}")
            }
            Self::ChunkDims(err) => write!(f, "invalid chunk dimensions: {err}"),
            Self::RadiusTooSmall { value } => {
                write!(f, "column generation radius must be at least 1, got {value}")
            }
            Self::InvalidUpdateInterval { value } => {
                write!(f, "world update interval must be positive, got {value}")
            }
            Self::Layer(err) => write!(f, "invalid terrain layer: {err}"),
            Self::Parse(err) => write!(f, "failed to parse world config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<DimsError> for ConfigError {
    fn from(err: DimsError) -> Self {
        Self::ChunkDims(err)
    }
}

impl From<LayerError> for ConfigError {
    fn from(err: LayerError) -> Self {
        Self::Layer(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

impl WorldConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        debug!(
            "loaded world config: {:?} chunk columns, {:?} blocks per chunk, radius {}",
            config.world_dimensions, config.chunk_dimensions, config.column_radius
        );
        Ok(config)
    }

    /// Misconfiguration is rejected up front rather than degrading into
    /// empty worlds or stalled streaming later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let axes = [
            ("x", self.world_dimensions.x),
            ("y", self.world_dimensions.y),
            ("z", self.world_dimensions.z),
        ];
        for (axis, value) in axes {
            if value < 1 {
                return Err(ConfigError::WorldDimensionTooSmall { axis, value });
            }
        }

        self.chunk_dims()?;

        if self.column_radius < 1 {
            return Err(ConfigError::RadiusTooSmall {
                value: self.column_radius,
            });
        }

        if !self.update_interval_secs.is_finite() || self.update_interval_secs <= 0.0 {
            return Err(ConfigError::InvalidUpdateInterval {
                value: self.update_interval_secs,
            });
        }

        self.layers.validate()?;
        Ok(())
    }

    pub fn chunk_dims(&self) -> Result<ChunkDims, DimsError> {
        let clamp = |value: i32| -> usize {
            if value < 0 {
                0
            } else {
                value as usize
            }
        };

        ChunkDims::new(
            clamp(self.chunk_dimensions.x),
            clamp(self.chunk_dimensions.y),
            clamp(self.chunk_dimensions.z),
        )
    }

    pub fn column_count(&self) -> u32 {
        self.world_dimensions.x as u32 * self.world_dimensions.z as u32
    }
}
