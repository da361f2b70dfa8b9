use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::BlockType;
use crate::noise::NoiseField;

const DIAMOND_ROLL_SALT: u64 = 30_001;
const STONE_ROLL_SALT: u64 = 30_002;

/// One fractal-noise layer of the terrain stack. `probability` only
/// matters for ore-like layers and defaults to zero when absent from
/// the configuration file.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub octaves: u32,
    pub scale: f32,
    pub amplitude: f32,
    pub offset: f32,
    #[serde(default)]
    pub probability: f32,
}

/// The 3D carving layer. Blocks whose 3D sample falls below
/// `carve_cutoff` are candidates for cave voids.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct CaveLayer {
    pub octaves: u32,
    pub scale: f32,
    pub amplitude: f32,
    pub offset: f32,
    pub carve_cutoff: f32,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TerrainLayers {
    pub surface: NoiseLayer,
    pub stone: NoiseLayer,
    pub diamond_top: NoiseLayer,
    pub diamond_bottom: NoiseLayer,
    pub cave: CaveLayer,
    pub cave_ceiling: NoiseLayer,
}

impl Default for TerrainLayers {
    fn default() -> Self {
        Self {
            surface: NoiseLayer {
                octaves: 4,
                scale: 0.03,
                amplitude: 6.0,
                offset: 3.0,
                probability: 0.0,
            },
            stone: NoiseLayer {
                octaves: 4,
                scale: 0.05,
                amplitude: 5.0,
                offset: 2.0,
                probability: 0.55,
            },
            diamond_top: NoiseLayer {
                octaves: 3,
                scale: 0.06,
                amplitude: 4.0,
                offset: 3.0,
                probability: 0.45,
            },
            diamond_bottom: NoiseLayer {
                octaves: 3,
                scale: 0.06,
                amplitude: 4.0,
                offset: 1.0,
                probability: 0.1,
            },
            cave: CaveLayer {
                octaves: 2,
                scale: 0.1,
                amplitude: 2.0,
                offset: 1.0,
                carve_cutoff: 1.6,
            },
            cave_ceiling: NoiseLayer {
                octaves: 2,
                scale: 0.07,
                amplitude: 5.0,
                offset: 4.0,
                probability: 0.0,
            },
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LayerError {
    ProbabilityOutOfRange { layer: &'static str, value: f32 },
    InvalidScale { layer: &'static str, value: f32 },
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange { layer, value } => {
                write!(f, "layer '{layer}' probability {value} is outside [0, 1]")
            }
            Self::InvalidScale { layer, value } => {
                write!(f, "layer '{layer}' scale {value} must be finite and positive")
            }
        }
    }
}

impl std::error::Error for LayerError {}

impl TerrainLayers {
    pub fn validate(&self) -> Result<(), LayerError> {
        let layers = [
            ("surface", &self.surface),
            ("stone", &self.stone),
            ("diamond_top", &self.diamond_top),
            ("diamond_bottom", &self.diamond_bottom),
            ("cave_ceiling", &self.cave_ceiling),
        ];

        for (name, layer) in layers {
            if !layer.scale.is_finite() || layer.scale <= 0.0 {
                return Err(LayerError::InvalidScale {
                    layer: name,
                    value: layer.scale,
                });
            }
            if !(0.0..=1.0).contains(&layer.probability) {
                return Err(LayerError::ProbabilityOutOfRange {
                    layer: name,
                    value: layer.probability,
                });
            }
        }

        if !self.cave.scale.is_finite() || self.cave.scale <= 0.0 {
            return Err(LayerError::InvalidScale {
                layer: "cave",
                value: self.cave.scale,
            });
        }

        Ok(())
    }
}

/// Decides the block type at a single world coordinate by combining the
/// configured noise layers in strict priority order. Pure and
/// deterministic for a fixed (seed, layers) pair.
#[derive(Clone, Debug)]
pub struct TerrainClassifier {
    noise: NoiseField,
    layers: TerrainLayers,
    seed: u64,
}

impl TerrainClassifier {
    pub fn new(seed: u64, layers: TerrainLayers) -> Result<Self, LayerError> {
        layers.validate()?;
        Ok(Self {
            noise: NoiseField::new(seed as u32),
            layers,
            seed,
        })
    }

    pub fn layers(&self) -> &TerrainLayers {
        &self.layers
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Un-truncated surface height, used for observer spawn placement.
    pub fn surface_height(&self, x: f32, z: f32) -> f32 {
        let layer = self.layers.surface;
        self.noise
            .sample(x, z, layer.octaves, layer.scale, layer.amplitude, layer.offset)
    }

    /// Priority order, first match wins:
    /// 1. y == 0 is the bedrock floor.
    /// 2. Cave carving (below the cutoff and under the cave ceiling).
    /// 3. Exact surface-height match becomes the grass surface band.
    /// 4. Inside the diamond band: diamond or stone by per-block roll.
    /// 5. Below stone height: stone by per-block roll.
    /// 6. Below surface height: dirt.
    /// 7. Air.
    ///
    /// Lower, rarer materials are tested before the common overlying
    /// ones; carving runs before any material decision so tunnels can
    /// cut through the ore bands.
    pub fn classify(&self, world_x: i32, world_y: i32, world_z: i32) -> BlockType {
        if world_y == 0 {
            return BlockType::Bedrock;
        }

        let xf = world_x as f32;
        let yf = world_y as f32;
        let zf = world_z as f32;

        let cave = self.layers.cave;
        let carve = self
            .noise
            .sample3d(xf, yf, zf, cave.octaves, cave.scale, cave.amplitude, cave.offset);
        let ceiling = self.layer_height(&self.layers.cave_ceiling, xf, zf);
        if carve < cave.carve_cutoff && ceiling > world_y {
            return BlockType::Air;
        }

        let surface = self.layer_height(&self.layers.surface, xf, zf);
        if surface == world_y {
            return BlockType::GrassSide;
        }

        let diamond_top = self.layer_height(&self.layers.diamond_top, xf, zf);
        let diamond_bottom = self.layer_height(&self.layers.diamond_bottom, xf, zf);
        if diamond_top > world_y && diamond_bottom < world_y {
            let roll = self.roll(world_x, world_y, world_z, DIAMOND_ROLL_SALT);
            if roll < self.layers.diamond_top.probability
                && roll > self.layers.diamond_bottom.probability
            {
                return BlockType::Diamond;
            }
            return BlockType::Stone;
        }

        let stone = self.layer_height(&self.layers.stone, xf, zf);
        if stone > world_y
            && self.roll(world_x, world_y, world_z, STONE_ROLL_SALT) < self.layers.stone.probability
        {
            return BlockType::Stone;
        }

        if surface > world_y {
            return BlockType::Dirt;
        }

        BlockType::Air
    }

    fn layer_height(&self, layer: &NoiseLayer, x: f32, z: f32) -> i32 {
        self.noise
            .sample(x, z, layer.octaves, layer.scale, layer.amplitude, layer.offset) as i32
    }

    /// Per-block uniform roll in [0, 1], hashed from seed and
    /// coordinate. Ore placement stays spatially incoherent but
    /// reproducible, so evicted chunks regenerate identically.
    fn roll(&self, x: i32, y: i32, z: i32, salt: u64) -> f32 {
        let hash = self
            .seed
            .wrapping_add(salt)
            .wrapping_mul(6364136223846793005)
            .wrapping_add((x as i64 as u64).wrapping_mul(1442695040888963407))
            .wrapping_add((y as i64 as u64).wrapping_mul(22695477))
            .wrapping_add((z as i64 as u64).wrapping_mul(1103515245));

        ((hash >> 11) & 0xffff) as f32 / 65535.0
    }
}

#[cfg(test)]
mod tests {
    use super::{CaveLayer, LayerError, NoiseLayer, TerrainClassifier, TerrainLayers};
    use crate::block::BlockType;

    fn flat_layer(offset: f32, probability: f32) -> NoiseLayer {
        // Zero octaves pin the layer height to its offset, making the
        // classifier's decisions exact for tests.
        NoiseLayer {
            octaves: 0,
            scale: 0.5,
            amplitude: 0.0,
            offset,
            probability,
        }
    }

    fn no_caves() -> CaveLayer {
        CaveLayer {
            octaves: 0,
            scale: 0.5,
            amplitude: 0.0,
            offset: 10.0,
            carve_cutoff: 0.0,
        }
    }

    fn layers_with_surface(surface_offset: f32) -> TerrainLayers {
        TerrainLayers {
            surface: flat_layer(surface_offset, 0.0),
            stone: flat_layer(0.0, 0.0),
            diamond_top: flat_layer(0.0, 0.0),
            diamond_bottom: flat_layer(0.0, 0.0),
            cave: no_caves(),
            cave_ceiling: flat_layer(0.0, 0.0),
        }
    }

    #[test]
    fn world_floor_is_always_bedrock() {
        // Even a configuration that carves everything must leave y=0.
        let mut layers = layers_with_surface(5.0);
        layers.cave = CaveLayer {
            octaves: 0,
            scale: 0.5,
            amplitude: 0.0,
            offset: 0.0,
            carve_cutoff: 100.0,
        };
        layers.cave_ceiling = flat_layer(100.0, 0.0);
        let classifier = TerrainClassifier::new(1, layers).expect("classifier");

        for (x, z) in [(0, 0), (-40, 17), (1000, -1000)] {
            assert_eq!(classifier.classify(x, 0, z), BlockType::Bedrock);
        }
    }

    #[test]
    fn cave_carving_wins_over_surface_and_ore() {
        let mut layers = layers_with_surface(5.0);
        layers.cave = CaveLayer {
            octaves: 0,
            scale: 0.5,
            amplitude: 0.0,
            offset: 0.0,
            carve_cutoff: 1.0,
        };
        layers.cave_ceiling = flat_layer(20.0, 0.0);
        let classifier = TerrainClassifier::new(1, layers).expect("classifier");

        // y=5 would be the grass surface, y=3 would be dirt; both carve.
        assert_eq!(classifier.classify(4, 5, 4), BlockType::Air);
        assert_eq!(classifier.classify(4, 3, 4), BlockType::Air);
        // Above the cave ceiling nothing carves, so air comes from rule 7.
        assert_eq!(classifier.classify(4, 25, 4), BlockType::Air);
    }

    #[test]
    fn surface_band_is_exactly_one_block_thick() {
        let classifier =
            TerrainClassifier::new(1, layers_with_surface(5.4)).expect("classifier");

        assert_eq!(classifier.classify(2, 5, 2), BlockType::GrassSide);
        assert_eq!(classifier.classify(2, 4, 2), BlockType::Dirt);
        assert_eq!(classifier.classify(2, 6, 2), BlockType::Air);
    }

    #[test]
    fn diamond_band_places_ore_between_its_bounds() {
        let mut layers = layers_with_surface(20.0);
        layers.diamond_top = flat_layer(8.0, 1.0);
        layers.diamond_bottom = flat_layer(2.0, 0.0);
        let classifier = TerrainClassifier::new(77, layers).expect("classifier");

        let mut diamonds = 0usize;
        for x in 0..10 {
            for z in 0..10 {
                for y in 3..8 {
                    let block = classifier.classify(x, y, z);
                    assert!(
                        block == BlockType::Diamond || block == BlockType::Stone,
                        "unexpected {block:?} inside the diamond band"
                    );
                    if block == BlockType::Diamond {
                        diamonds += 1;
                    }
                }
            }
        }

        // With probabilities (1.0, 0.0) essentially every roll lands.
        assert!(diamonds > 450, "only {diamonds} diamonds in 500 samples");

        // Outside the band the ore rule never fires.
        assert_eq!(classifier.classify(0, 9, 0), BlockType::Dirt);
    }

    #[test]
    fn stone_layer_fills_below_its_height() {
        let mut layers = layers_with_surface(20.0);
        layers.stone = flat_layer(9.0, 1.0);
        let classifier = TerrainClassifier::new(5, layers).expect("classifier");

        let mut stones = 0usize;
        for x in 0..10 {
            for z in 0..5 {
                let block = classifier.classify(x, 4, z);
                assert!(block == BlockType::Stone || block == BlockType::Dirt);
                if block == BlockType::Stone {
                    stones += 1;
                }
            }
        }
        assert!(stones >= 48, "only {stones} stone in 50 samples at probability 1.0");

        // Above the stone height the layer is inert.
        assert_eq!(classifier.classify(0, 12, 0), BlockType::Dirt);
    }

    #[test]
    fn classification_is_deterministic() {
        let layers = TerrainLayers::default();
        let a = TerrainClassifier::new(0xBEEF, layers).expect("classifier");
        let b = TerrainClassifier::new(0xBEEF, layers).expect("classifier");

        for x in -8..8 {
            for y in 0..16 {
                for z in -8..8 {
                    assert_eq!(a.classify(x, y, z), b.classify(x, y, z));
                }
            }
        }
    }

    #[test]
    fn invalid_layer_configuration_fails_fast() {
        let mut layers = TerrainLayers::default();
        layers.stone.probability = 1.5;
        assert_eq!(
            TerrainClassifier::new(1, layers).err(),
            Some(LayerError::ProbabilityOutOfRange {
                layer: "stone",
                value: 1.5
            })
        );

        let mut layers = TerrainLayers::default();
        layers.surface.scale = 0.0;
        assert_eq!(
            TerrainClassifier::new(1, layers).err(),
            Some(LayerError::InvalidScale {
                layer: "surface",
                value: 0.0
            })
        );
    }
}
