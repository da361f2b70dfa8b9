use glam::Vec3;
use lodestone_shared::block::{atlas_uvs, BlockType};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockSide {
    Bottom,
    Top,
    Left,
    Right,
    Front,
    Back,
}

/// Triangle winding applied to the four selected corners of every face,
/// clockwise so the outside of the cube is the front side.
pub const FACE_WINDING: [u32; 6] = [3, 1, 0, 3, 2, 1];

/// One quad of one block: four vertices and the implicit
/// [`FACE_WINDING`] triangle pair. Ephemeral, consumed by the merger.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMesh {
    pub positions: [[f32; 3]; 4],
    pub normals: [[f32; 3]; 4],
    pub uvs: [[f32; 2]; 4],
}

impl FaceMesh {
    pub fn indices(&self) -> [u32; 6] {
        FACE_WINDING
    }
}

/// The eight corners of a unit cube centered on `origin`. Every face of
/// the same block derives its corners from this one table, so shared
/// corner positions come out bit-identical, which the merger's
/// exact-equality vertex dedup depends on.
fn cube_corners(origin: Vec3) -> [[f32; 3]; 8] {
    let corner = |dx: f32, dy: f32, dz: f32| [origin.x + dx, origin.y + dy, origin.z + dz];

    [
        corner(-0.5, -0.5, 0.5),
        corner(0.5, -0.5, 0.5),
        corner(0.5, -0.5, -0.5),
        corner(-0.5, -0.5, -0.5),
        corner(-0.5, 0.5, 0.5),
        corner(0.5, 0.5, 0.5),
        corner(0.5, 0.5, -0.5),
        corner(-0.5, 0.5, -0.5),
    ]
}

/// Builds the quad for one side of a block of the given type at
/// `origin`. Always succeeds; UVs come from the block's atlas row.
pub fn build_face(side: BlockSide, origin: Vec3, block: BlockType) -> FaceMesh {
    let p = cube_corners(origin);
    let uv = atlas_uvs(block);

    let (positions, normal) = match side {
        BlockSide::Front => ([p[4], p[5], p[1], p[0]], [0.0, 0.0, 1.0]),
        BlockSide::Back => ([p[6], p[7], p[3], p[2]], [0.0, 0.0, -1.0]),
        BlockSide::Bottom => ([p[0], p[1], p[2], p[3]], [0.0, -1.0, 0.0]),
        BlockSide::Top => ([p[7], p[6], p[5], p[4]], [0.0, 1.0, 0.0]),
        BlockSide::Left => ([p[7], p[4], p[0], p[3]], [-1.0, 0.0, 0.0]),
        BlockSide::Right => ([p[5], p[6], p[2], p[1]], [1.0, 0.0, 0.0]),
    };

    FaceMesh {
        positions,
        normals: [normal; 4],
        // Corner order pairs (1,1), (0,1), (0,0), (1,0) of the tile with
        // the selected cube corners above.
        uvs: [uv[3], uv[2], uv[0], uv[1]],
    }
}
