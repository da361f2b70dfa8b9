use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Per-chunk grid extents. Width runs along X, height along Y, depth
/// along Z. Construction rejects zero-sized axes so every later index
/// computation can assume a non-empty grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DimsError {
    ZeroAxis { axis: &'static str },
}

impl fmt::Display for DimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroAxis { axis } => {
                write!(f, "chunk dimension '{axis}' must be at least 1")
            }
        }
    }
}

impl std::error::Error for DimsError {}

impl ChunkDims {
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self, DimsError> {
        if width == 0 {
            return Err(DimsError::ZeroAxis { axis: "width" });
        }
        if height == 0 {
            return Err(DimsError::ZeroAxis { axis: "height" });
        }
        if depth == 0 {
            return Err(DimsError::ZeroAxis { axis: "depth" });
        }

        Ok(Self {
            width,
            height,
            depth,
        })
    }

    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// True when `local` lies inside the grid. Accepts signed input so
    /// neighbour probes one step outside the chunk resolve to false
    /// instead of wrapping.
    pub fn contains(&self, local: IVec3) -> bool {
        local.x >= 0
            && (local.x as usize) < self.width
            && local.y >= 0
            && (local.y as usize) < self.height
            && local.z >= 0
            && (local.z as usize) < self.depth
    }
}

/// Block coordinate local to one chunk, always in-bounds by construction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

/// Flat index into the chunk's block array: x varies fastest, then y,
/// then z (x + width * (y + height * z)).
pub fn local_to_index(dims: ChunkDims, local: LocalPos) -> usize {
    local.x + dims.width * (local.y + dims.height * local.z)
}

pub fn index_to_local(dims: ChunkDims, index: usize) -> LocalPos {
    assert!(
        index < dims.volume(),
        "chunk index {index} out of bounds for {}x{}x{} volume",
        dims.width,
        dims.height,
        dims.depth
    );

    let plane = dims.width * dims.height;
    let z = index / plane;
    let rem = index % plane;

    LocalPos {
        x: rem % dims.width,
        y: rem / dims.width,
        z,
    }
}
