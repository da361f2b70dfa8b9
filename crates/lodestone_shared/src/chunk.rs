use glam::IVec3;

use crate::block::BlockType;
use crate::coords::{index_to_local, local_to_index, ChunkDims, LocalPos};

/// One chunk's block grid: a flat array over (width, height, depth) plus
/// the chunk's world-space origin. Populated once by the terrain
/// classifier and read-only during meshing; since generation is a pure
/// function of (origin, layer parameters), a discarded volume can be
/// regenerated bit-identically.
#[derive(Clone, Debug)]
pub struct ChunkVolume {
    dims: ChunkDims,
    origin: IVec3,
    blocks: Vec<BlockType>,
}

impl ChunkVolume {
    pub fn new(dims: ChunkDims, origin: IVec3) -> Self {
        Self {
            dims,
            origin,
            blocks: vec![BlockType::Air; dims.volume()],
        }
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, local: LocalPos) -> BlockType {
        self.blocks[local_to_index(self.dims, local)]
    }

    pub fn set(&mut self, local: LocalPos, block: BlockType) {
        let index = local_to_index(self.dims, local);
        self.blocks[index] = block;
    }

    pub fn get_index(&self, index: usize) -> BlockType {
        self.blocks[index]
    }

    pub fn set_index(&mut self, index: usize, block: BlockType) {
        self.blocks[index] = block;
    }

    pub fn local_of_index(&self, index: usize) -> LocalPos {
        index_to_local(self.dims, index)
    }

    /// Block at a signed local coordinate, or None outside the grid.
    /// Neighbour probes across the chunk boundary land here.
    pub fn block_at(&self, local: IVec3) -> Option<BlockType> {
        if !self.dims.contains(local) {
            return None;
        }

        Some(self.get(LocalPos {
            x: local.x as usize,
            y: local.y as usize,
            z: local.z as usize,
        }))
    }

    /// World-space position of a local block coordinate.
    pub fn world_pos(&self, local: LocalPos) -> IVec3 {
        self.origin + local.as_ivec3()
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::ChunkVolume;
    use crate::block::BlockType;
    use crate::coords::{ChunkDims, LocalPos};

    #[test]
    fn volume_allocates_air_and_round_trips_blocks() {
        let dims = ChunkDims::new(10, 10, 10).expect("dims");
        let mut volume = ChunkVolume::new(dims, IVec3::new(20, 0, -10));

        assert_eq!(volume.len(), 1000);
        let pos = LocalPos { x: 3, y: 7, z: 1 };
        assert_eq!(volume.get(pos), BlockType::Air);

        volume.set(pos, BlockType::Diamond);
        assert_eq!(volume.get(pos), BlockType::Diamond);
        assert_eq!(volume.world_pos(pos), IVec3::new(23, 7, -9));
    }

    #[test]
    fn out_of_bounds_probes_return_none() {
        let dims = ChunkDims::new(2, 2, 2).expect("dims");
        let volume = ChunkVolume::new(dims, IVec3::ZERO);

        assert_eq!(volume.block_at(IVec3::new(0, 0, 0)), Some(BlockType::Air));
        assert_eq!(volume.block_at(IVec3::new(-1, 0, 0)), None);
        assert_eq!(volume.block_at(IVec3::new(0, 2, 0)), None);
        assert_eq!(volume.block_at(IVec3::new(0, 0, 5)), None);
    }
}
