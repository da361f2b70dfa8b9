use std::fmt;

use noise::{NoiseFn, Perlin};

/// Deterministic fractal noise over a seeded Perlin source. Every
/// terrain layer samples through one of these; identical (seed, input)
/// pairs always produce bit-identical output, which is what lets the
/// streamer discard chunk volumes and regenerate them later.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Fractal sum: `octaves` layers sampled at (coord * scale * 2^i),
    /// each weighted by the full `amplitude` (no per-octave falloff),
    /// plus `offset`. Zero octaves yields exactly `offset`.
    ///
    /// The raw noise lies in [-1, 1]; it is remapped to [0, 1] before
    /// scaling so layer heights stay non-negative for positive
    /// amplitudes.
    pub fn sample(&self, x: f32, z: f32, octaves: u32, scale: f32, amplitude: f32, offset: f32) -> f32 {
        let mut total = 0.0_f32;
        let mut frequency = 1.0_f32;

        for _ in 0..octaves {
            let raw = self
                .perlin
                .get([f64::from(x * scale * frequency), f64::from(z * scale * frequency)])
                as f32;
            total += (raw + 1.0) * 0.5 * amplitude;
            frequency *= 2.0;
        }

        total + offset
    }

    /// 3D variant used by cave carving: the average of the six ordered
    /// axis-pair 2D samples (xy, xz, yz, yx, zx, zy).
    pub fn sample3d(
        &self,
        x: f32,
        y: f32,
        z: f32,
        octaves: u32,
        scale: f32,
        amplitude: f32,
        offset: f32,
    ) -> f32 {
        let xy = self.sample(x, y, octaves, scale, amplitude, offset);
        let xz = self.sample(x, z, octaves, scale, amplitude, offset);
        let yz = self.sample(y, z, octaves, scale, amplitude, offset);
        let yx = self.sample(y, x, octaves, scale, amplitude, offset);
        let zx = self.sample(z, x, octaves, scale, amplitude, offset);
        let zy = self.sample(z, y, octaves, scale, amplitude, offset);

        (xy + xz + yz + yx + zx + zy) / 6.0
    }
}
