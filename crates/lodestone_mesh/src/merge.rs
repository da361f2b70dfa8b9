use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::face::{FaceMesh, FACE_WINDING};

/// Axis-aligned bounds recomputed after every merge, consumed by the
/// external renderer and collider.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let mut min = Vec3::from_array(*first);
        let mut max = min;
        for point in &points[1..] {
            let p = Vec3::from_array(*point);
            min = min.min(p);
            max = max.max(p);
        }

        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Dedup identity for one vertex: the exact bit patterns of position,
/// normal and uv. There is no epsilon; two faces only share a vertex
/// when the generator produced bit-identical attributes for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct VertexKey {
    position: [u32; 3],
    normal: [u32; 3],
    uv: [u32; 2],
}

impl VertexKey {
    fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position: position.map(f32::to_bits),
            normal: normal.map(f32::to_bits),
            uv: uv.map(f32::to_bits),
        }
    }
}

/// Vertex/index buffers for one block after face merging.
#[derive(Clone, Debug, Default)]
pub struct BlockMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl BlockMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Merges a set of face meshes into one vertex/index buffer. `None`
/// entries are culled or voided faces and are skipped. Vertices are
/// deduplicated by [`VertexKey`] and kept in first-seen order; each
/// face's winding is rewritten through the dedup map, so the output
/// triangle count equals the sum of the input triangle counts.
pub fn merge_faces(faces: &[Option<FaceMesh>]) -> BlockMesh {
    let mut order: FxHashMap<VertexKey, u32> = FxHashMap::default();
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for face in faces.iter().flatten() {
        for i in 0..4 {
            let key = VertexKey::new(face.positions[i], face.normals[i], face.uvs[i]);
            order.entry(key).or_insert_with(|| {
                let next = positions.len() as u32;
                positions.push(face.positions[i]);
                normals.push(face.normals[i]);
                uvs.push(face.uvs[i]);
                next
            });
        }

        for &corner in &FACE_WINDING {
            let i = corner as usize;
            let key = VertexKey::new(face.positions[i], face.normals[i], face.uvs[i]);
            let mapped = *order
                .get(&key)
                .expect("vertex registered above is missing from the dedup map");
            indices.push(mapped);
        }
    }

    let bounds = Aabb::from_points(&positions);

    BlockMesh {
        positions,
        normals,
        uvs,
        indices,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use lodestone_shared::block::BlockType;

    use super::{merge_faces, Aabb, BlockMesh};
    use crate::face::{build_face, BlockSide, FaceMesh};

    /// A +Y quad spanning [x0, x0+1] x [z0, z0+1] at height y, with a
    /// uniform uv so shared-edge vertices are bit-identical.
    fn flat_quad(x0: f32, z0: f32, y: f32) -> FaceMesh {
        FaceMesh {
            positions: [
                [x0, y, z0],
                [x0 + 1.0, y, z0],
                [x0 + 1.0, y, z0 + 1.0],
                [x0, y, z0 + 1.0],
            ],
            normals: [[0.0, 1.0, 0.0]; 4],
            uvs: [[0.0, 0.0]; 4],
        }
    }

    #[test]
    fn adjacent_quads_share_their_edge_vertices() {
        let a = flat_quad(0.0, 0.0, 1.0);
        let b = flat_quad(1.0, 0.0, 1.0);

        let merged = merge_faces(&[Some(a), Some(b)]);

        // 4 + 4 vertices with two shared along the x=1 edge.
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.index_count(), 12);
        assert_eq!(merged.triangle_count(), 4);
    }

    #[test]
    fn duplicate_quads_collapse_to_one_vertex_set() {
        let quad = flat_quad(0.0, 0.0, 0.0);
        let merged = merge_faces(&[Some(quad.clone()), Some(quad)]);

        assert_eq!(merged.vertex_count(), 4);
        // Both quads keep their triangles; only vertices dedupe.
        assert_eq!(merged.index_count(), 12);
    }

    #[test]
    fn none_entries_are_skipped() {
        let quad = flat_quad(2.0, 3.0, 0.0);
        let merged = merge_faces(&[None, Some(quad), None, None]);

        assert_eq!(merged.vertex_count(), 4);
        assert_eq!(merged.index_count(), 6);

        let empty = merge_faces(&[None, None]);
        assert!(empty.is_empty());
        assert_eq!(empty.bounds, Aabb::default());
    }

    #[test]
    fn vertex_order_is_first_seen() {
        let quad = flat_quad(0.0, 0.0, 0.0);
        let merged = merge_faces(&[Some(quad.clone())]);

        assert_eq!(merged.positions, quad.positions.to_vec());
        // Winding indices refer to the registration order.
        assert_eq!(merged.indices, vec![3, 1, 0, 3, 2, 1]);
    }

    #[test]
    fn cube_faces_never_cross_dedupe() {
        // Faces of one block share corner positions but never normals,
        // so a full cube keeps 4 unique vertices per face.
        let origin = Vec3::ZERO;
        let faces: Vec<Option<FaceMesh>> = [
            BlockSide::Top,
            BlockSide::Bottom,
            BlockSide::Left,
            BlockSide::Right,
            BlockSide::Front,
            BlockSide::Back,
        ]
        .into_iter()
        .map(|side| Some(build_face(side, origin, BlockType::Stone)))
        .collect();

        let merged = merge_faces(&faces);
        assert_eq!(merged.vertex_count(), 24);
        assert_eq!(merged.index_count(), 36);
    }

    #[test]
    fn bounds_cover_the_merged_geometry() {
        let a = flat_quad(0.0, 0.0, 1.0);
        let b = flat_quad(3.0, -2.0, 5.0);
        let merged = merge_faces(&[Some(a), Some(b)]);

        assert_eq!(merged.bounds.min, Vec3::new(0.0, 1.0, -2.0));
        assert_eq!(merged.bounds.max, Vec3::new(4.0, 5.0, 1.0));
    }

    #[test]
    fn empty_input_produces_an_empty_mesh() {
        let merged: BlockMesh = merge_faces(&[]);
        assert!(merged.is_empty());
        assert_eq!(merged.index_count(), 0);
    }
}
