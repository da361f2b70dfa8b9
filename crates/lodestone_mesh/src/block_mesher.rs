use glam::IVec3;
use lodestone_shared::block::{face_materials, is_solid, BlockType};
use lodestone_shared::chunk::ChunkVolume;
use lodestone_shared::coords::LocalPos;

use crate::face::{build_face, BlockSide, FaceMesh};
use crate::merge::{merge_faces, BlockMesh};

/// True when the block at `neighbour` occludes the face pointing at it.
/// Coordinates outside the volume count as open: chunks do not exchange
/// culling information across their boundaries, so edge faces are
/// always drawn.
pub fn has_solid_neighbour(volume: &ChunkVolume, neighbour: IVec3) -> bool {
    volume.block_at(neighbour).is_some_and(is_solid)
}

/// Builds the merged mesh for one block, keeping only the faces whose
/// neighbour test fails. AIR and fully-occluded blocks produce nothing.
pub fn build_block(volume: &ChunkVolume, local: LocalPos) -> Option<BlockMesh> {
    let block = volume.get(local);
    if block == BlockType::Air {
        return None;
    }

    let materials = face_materials(block);
    let origin = volume.world_pos(local).as_vec3();
    let here = local.as_ivec3();

    let candidates = [
        (BlockSide::Top, IVec3::new(0, 1, 0), materials.top),
        (BlockSide::Bottom, IVec3::new(0, -1, 0), materials.bottom),
        (BlockSide::Right, IVec3::new(1, 0, 0), materials.side),
        (BlockSide::Left, IVec3::new(-1, 0, 0), materials.side),
        (BlockSide::Front, IVec3::new(0, 0, 1), materials.side),
        (BlockSide::Back, IVec3::new(0, 0, -1), materials.side),
    ];

    let mut faces: Vec<Option<FaceMesh>> = Vec::with_capacity(candidates.len());
    let mut visible = 0usize;
    for (side, offset, material) in candidates {
        if has_solid_neighbour(volume, here + offset) {
            faces.push(None);
        } else {
            faces.push(Some(build_face(side, origin, material)));
            visible += 1;
        }
    }

    if visible == 0 {
        return None;
    }

    Some(merge_faces(&faces))
}
