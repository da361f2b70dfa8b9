use glam::IVec3;
use lodestone_core::jobs::JobSystem;
use lodestone_shared::chunk::ChunkVolume;
use lodestone_shared::coords::{ChunkDims, LocalPos};
use lodestone_shared::terrain::TerrainClassifier;
use tracing::debug;

use crate::block_mesher::build_block;
use crate::merge::{Aabb, BlockMesh};

/// Descriptor for the single submesh spanning the full buffers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubMesh {
    pub first_index: u32,
    pub index_count: u32,
    pub vertex_count: u32,
}

/// The draw-ready mesh for one chunk: planar vertex buffers, a flat
/// triangle index buffer, one submesh descriptor and bounds. Built once
/// per chunk generation and immutable afterwards; regeneration replaces
/// it wholesale.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub submesh: SubMesh,
    pub bounds: Aabb,
}

impl ChunkMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Runs the classifier over every coordinate of a fresh volume. This is
/// the only place noise is evaluated during a chunk build.
pub fn populate_volume(
    classifier: &TerrainClassifier,
    origin: IVec3,
    dims: ChunkDims,
) -> ChunkVolume {
    let mut volume = ChunkVolume::new(dims, origin);
    for index in 0..volume.len() {
        let local = volume.local_of_index(index);
        let world = volume.world_pos(local);
        volume.set_index(index, classifier.classify(world.x, world.y, world.z));
    }
    volume
}

/// One task of the parallel fill: a block mesh plus the disjoint spans
/// of the shared output buffers it writes.
struct FillPartition<'a> {
    vertex_offset: usize,
    source: &'a BlockMesh,
    positions: &'a mut [[f32; 3]],
    normals: &'a mut [[f32; 3]],
    uvs: &'a mut [[f32; 2]],
    indices: &'a mut [u32],
}

impl FillPartition<'_> {
    fn fill(self) {
        self.positions.copy_from_slice(&self.source.positions);
        self.normals.copy_from_slice(&self.source.normals);
        self.uvs.copy_from_slice(&self.source.uvs);

        assert_eq!(
            self.indices.len(),
            self.source.indices.len(),
            "index partition does not match its block mesh"
        );
        let base = self.vertex_offset as u32;
        for (slot, &index) in self.indices.iter_mut().zip(&self.source.indices) {
            *slot = base + index;
        }
    }
}

/// Meshes a populated volume into one chunk mesh.
///
/// Per-block meshes are collected in processing order, a sequential
/// prefix sum over their vertex/index counts sizes the shared buffers
/// exactly, and the fill then runs as one parallel task per block over
/// non-overlapping spans. The scope join makes the call synchronous; a
/// sizing mismatch is a meshing bug and panics rather than emitting
/// corrupt geometry.
pub fn build_chunk_mesh(volume: &ChunkVolume, jobs: &JobSystem) -> ChunkMesh {
    let dims = volume.dims();

    let mut block_meshes: Vec<BlockMesh> = Vec::new();
    for z in 0..dims.depth {
        for y in 0..dims.height {
            for x in 0..dims.width {
                if let Some(mesh) = build_block(volume, LocalPos { x, y, z }) {
                    block_meshes.push(mesh);
                }
            }
        }
    }

    if block_meshes.is_empty() {
        return ChunkMesh::default();
    }

    let mut vertex_offsets = Vec::with_capacity(block_meshes.len());
    let mut vertex_total = 0usize;
    let mut index_total = 0usize;
    for mesh in &block_meshes {
        vertex_offsets.push(vertex_total);
        vertex_total += mesh.vertex_count();
        index_total += mesh.index_count();
    }

    let mut positions = vec![[0.0_f32; 3]; vertex_total];
    let mut normals = vec![[0.0_f32; 3]; vertex_total];
    let mut uvs = vec![[0.0_f32; 2]; vertex_total];
    let mut indices = vec![0_u32; index_total];

    {
        let mut partitions = Vec::with_capacity(block_meshes.len());
        let mut pos_rest = positions.as_mut_slice();
        let mut norm_rest = normals.as_mut_slice();
        let mut uv_rest = uvs.as_mut_slice();
        let mut idx_rest = indices.as_mut_slice();

        for (i, mesh) in block_meshes.iter().enumerate() {
            let (pos_span, tail) = pos_rest.split_at_mut(mesh.vertex_count());
            pos_rest = tail;
            let (norm_span, tail) = norm_rest.split_at_mut(mesh.vertex_count());
            norm_rest = tail;
            let (uv_span, tail) = uv_rest.split_at_mut(mesh.vertex_count());
            uv_rest = tail;
            let (idx_span, tail) = idx_rest.split_at_mut(mesh.index_count());
            idx_rest = tail;

            partitions.push(FillPartition {
                vertex_offset: vertex_offsets[i],
                source: mesh,
                positions: pos_span,
                normals: norm_span,
                uvs: uv_span,
                indices: idx_span,
            });
        }

        assert!(
            pos_rest.is_empty() && idx_rest.is_empty(),
            "prefix sums must size the chunk buffers exactly"
        );

        jobs.scope(|scope| {
            for partition in partitions {
                scope.spawn(move |_| partition.fill());
            }
        });
    }

    let bounds = Aabb::from_points(&positions);
    debug!(
        "chunk mesh built at {:?}: {} vertices, {} indices",
        volume.origin(),
        vertex_total,
        index_total
    );

    ChunkMesh {
        positions,
        normals,
        uvs,
        indices,
        submesh: SubMesh {
            first_index: 0,
            index_count: index_total as u32,
            vertex_count: vertex_total as u32,
        },
        bounds,
    }
}

/// Generated chunk data: the block grid plus its finished mesh. The
/// volume can be dropped and regenerated later since population is
/// deterministic.
#[derive(Clone, Debug)]
pub struct BuiltChunk {
    pub volume: ChunkVolume,
    pub mesh: ChunkMesh,
}

/// Ties the classifier and the worker pool together for one-call chunk
/// builds. Configuration is captured at construction; `build` takes the
/// per-chunk inputs by value.
pub struct ChunkMeshBuilder<'a> {
    classifier: &'a TerrainClassifier,
    jobs: &'a JobSystem,
}

impl<'a> ChunkMeshBuilder<'a> {
    pub fn new(classifier: &'a TerrainClassifier, jobs: &'a JobSystem) -> Self {
        Self { classifier, jobs }
    }

    pub fn build(&self, origin: IVec3, dims: ChunkDims) -> BuiltChunk {
        let volume = populate_volume(self.classifier, origin, dims);
        let mesh = build_chunk_mesh(&volume, self.jobs);
        BuiltChunk { volume, mesh }
    }
}
