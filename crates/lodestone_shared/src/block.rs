/// Terrain block kinds. The discriminant order is load-bearing: it is
/// the row index into [`ATLAS_UVS`], so variants must stay in sync with
/// that table.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    GrassTop,
    GrassSide,
    Dirt,
    Water,
    Stone,
    Sand,
    Gold,
    Bedrock,
    Redstone,
    Diamond,
    NoCrack,
    Crack1,
    Crack2,
    Crack3,
    Crack4,
    #[default]
    Air,
}

/// Side length of one tile in the block texture atlas (16x16 tiles).
pub const ATLAS_TILE_SIZE: f32 = 0.0625;

/// Atlas UV corners per block type, ordered (0,0), (1,0), (0,1), (1,1)
/// in tile-local terms. AIR has no row; it never produces geometry.
const ATLAS_UVS: [[[f32; 2]; 4]; 15] = [
    // GrassTop
    [[0.125, 0.375], [0.1875, 0.375], [0.125, 0.4375], [0.1875, 0.4375]],
    // GrassSide
    [[0.1875, 0.9375], [0.25, 0.9375], [0.1875, 1.0], [0.25, 1.0]],
    // Dirt
    [[0.125, 0.9375], [0.1875, 0.9375], [0.125, 1.0], [0.1875, 1.0]],
    // Water
    [[0.875, 0.125], [0.9375, 0.125], [0.875, 0.1875], [0.9375, 0.1875]],
    // Stone
    [[0.0, 0.875], [0.0625, 0.875], [0.0, 0.9375], [0.0625, 0.9375]],
    // Sand
    [[0.125, 0.875], [0.1875, 0.875], [0.125, 0.9375], [0.1875, 0.9375]],
    // Gold
    [[0.0, 0.8125], [0.0625, 0.8125], [0.0, 0.875], [0.0625, 0.875]],
    // Bedrock
    [[0.3125, 0.8125], [0.375, 0.8125], [0.3125, 0.875], [0.375, 0.875]],
    // Redstone
    [[0.1875, 0.75], [0.25, 0.75], [0.1875, 0.8125], [0.25, 0.8125]],
    // Diamond
    [[0.125, 0.75], [0.1875, 0.75], [0.125, 0.8125], [0.1875, 0.8125]],
    // NoCrack
    [[0.6875, 0.0], [0.75, 0.0], [0.6875, 0.0625], [0.75, 0.0625]],
    // Crack1
    [[0.0, 0.0], [0.0625, 0.0], [0.0, 0.0625], [0.0625, 0.0625]],
    // Crack2
    [[0.0625, 0.0], [0.125, 0.0], [0.0625, 0.0625], [0.125, 0.0625]],
    // Crack3
    [[0.125, 0.0], [0.1875, 0.0], [0.125, 0.0625], [0.1875, 0.0625]],
    // Crack4
    [[0.1875, 0.0], [0.25, 0.0], [0.1875, 0.0625], [0.25, 0.0625]],
];

/// The four atlas UV corners for a block face of this type.
///
/// Panics for AIR: callers cull AIR before generating any face, so
/// reaching the lookup with it is a meshing bug, not a recoverable state.
pub fn atlas_uvs(block: BlockType) -> [[f32; 2]; 4] {
    assert!(
        block != BlockType::Air,
        "AIR has no atlas tile; it must be culled before face generation"
    );
    ATLAS_UVS[block as usize]
}

/// Solid blocks occlude the faces of their neighbours. Water is excluded
/// because it renders semi-transparent, so geometry behind it must still
/// be emitted.
pub fn is_solid(block: BlockType) -> bool {
    !matches!(block, BlockType::Air | BlockType::Water)
}

/// Per-side texturing of one block slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceMaterials {
    pub top: BlockType,
    pub side: BlockType,
    pub bottom: BlockType,
}

/// Grass occupies one block slot but textures as three materials; every
/// other block uses the same tile on all six sides.
pub fn face_materials(block: BlockType) -> FaceMaterials {
    match block {
        BlockType::GrassSide => FaceMaterials {
            top: BlockType::GrassTop,
            side: BlockType::GrassSide,
            bottom: BlockType::Dirt,
        },
        other => FaceMaterials {
            top: other,
            side: other,
            bottom: other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{atlas_uvs, face_materials, is_solid, BlockType, ATLAS_TILE_SIZE};

    #[test]
    fn atlas_rows_span_exactly_one_tile() {
        for block in [
            BlockType::GrassTop,
            BlockType::Dirt,
            BlockType::Stone,
            BlockType::Bedrock,
            BlockType::Diamond,
            BlockType::Crack4,
        ] {
            let uvs = atlas_uvs(block);
            let width = uvs[1][0] - uvs[0][0];
            let height = uvs[2][1] - uvs[0][1];
            assert!((width - ATLAS_TILE_SIZE).abs() < 1e-6, "{block:?} width");
            assert!((height - ATLAS_TILE_SIZE).abs() < 1e-6, "{block:?} height");
        }
    }

    #[test]
    #[should_panic(expected = "AIR has no atlas tile")]
    fn air_has_no_atlas_row() {
        atlas_uvs(BlockType::Air);
    }

    #[test]
    fn water_and_air_are_not_solid() {
        assert!(!is_solid(BlockType::Air));
        assert!(!is_solid(BlockType::Water));
        assert!(is_solid(BlockType::Dirt));
        assert!(is_solid(BlockType::Bedrock));
    }

    #[test]
    fn grass_expands_to_three_materials() {
        let grass = face_materials(BlockType::GrassSide);
        assert_eq!(grass.top, BlockType::GrassTop);
        assert_eq!(grass.side, BlockType::GrassSide);
        assert_eq!(grass.bottom, BlockType::Dirt);

        let stone = face_materials(BlockType::Stone);
        assert_eq!(stone.top, BlockType::Stone);
        assert_eq!(stone.side, BlockType::Stone);
        assert_eq!(stone.bottom, BlockType::Stone);
    }
}
