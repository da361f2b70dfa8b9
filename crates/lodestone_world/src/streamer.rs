use std::collections::VecDeque;

use glam::{IVec3, Vec2, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use lodestone_core::events::{channel, EventReceiver, EventSender};
use lodestone_core::jobs::JobSystem;
use lodestone_mesh::chunk_builder::{build_chunk_mesh, populate_volume, ChunkMesh};
use lodestone_shared::config::{ConfigError, WorldConfig};
use lodestone_shared::coords::ChunkDims;
use lodestone_shared::terrain::{LayerError, TerrainClassifier, TerrainLayers};

/// A chunk column key: the world-space (x, z) footprint shared by all
/// chunks stacked along Y at that position. Always chunk-aligned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnPos {
    pub x: i32,
    pub z: i32,
}

/// Streaming notifications for the external renderer and progress UI.
/// Mesh data itself stays owned by the registry; consumers look chunks
/// up by origin after a `ColumnBuilt`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WorldEvent {
    BuildProgress { built: u32, total: u32 },
    WorldReady { spawn: Vec3 },
    ColumnBuilt { column: ColumnPos },
    ColumnShown { column: ColumnPos },
    ColumnHidden { column: ColumnPos },
}

/// One deferred unit of streaming work: a single column build, a
/// single recursion step, or one hide sweep. The queue drains at most
/// one item per tick.
#[derive(Copy, Clone, Debug)]
enum WorkItem {
    BuildColumn { x: i32, z: i32 },
    RebuildColumn { x: i32, z: i32 },
    ExpandRadius { x: i32, z: i32, radius: i32 },
    HideDistant { x: i32, z: i32 },
}

/// Registry entry for one generated chunk. Hidden chunks keep their
/// mesh; reactivation just flips the flag.
#[derive(Clone, Debug)]
pub struct ChunkEntry {
    pub origin: IVec3,
    pub mesh: ChunkMesh,
    pub active: bool,
}

#[derive(Copy, Clone, Debug)]
enum Phase {
    Initializing { next_column: u32 },
    Running,
}

/// Maintains the set of realized chunk columns around a moving
/// observer: the initial world is built one column per tick, then
/// columns are generated and hidden on a radius policy through a
/// frame-sliced FIFO work queue. All registry mutation happens on the
/// caller's tick, so no synchronization is needed here; only the
/// per-chunk buffer fill inside the mesh builder is parallel.
pub struct WorldStreamer {
    config: WorldConfig,
    dims: ChunkDims,
    classifier: TerrainClassifier,
    jobs: JobSystem,
    chunks: FxHashMap<IVec3, ChunkEntry>,
    columns: FxHashSet<ColumnPos>,
    queue: VecDeque<WorkItem>,
    last_observer: Vec3,
    clock: f32,
    phase: Phase,
    spawn: Option<Vec3>,
    events: EventSender<WorldEvent>,
}

impl WorldStreamer {
    pub fn new(
        config: WorldConfig,
        jobs: JobSystem,
    ) -> Result<(Self, EventReceiver<WorldEvent>), ConfigError> {
        config.validate()?;
        let dims = config.chunk_dims()?;
        let classifier = TerrainClassifier::new(config.seed, config.layers)?;
        let (events, receiver) = channel();

        let streamer = Self {
            config,
            dims,
            classifier,
            jobs,
            chunks: FxHashMap::default(),
            columns: FxHashSet::default(),
            queue: VecDeque::new(),
            last_observer: Vec3::ZERO,
            clock: 0.0,
            phase: Phase::Initializing { next_column: 0 },
            spawn: None,
            events,
        };

        Ok((streamer, receiver))
    }

    /// Advances the streamer by one external frame. During
    /// initialization each call builds exactly one column of the
    /// configured world bounds; afterwards the observer poll runs on
    /// the configured interval and at most one queued work item is
    /// drained.
    pub fn tick(&mut self, observer: Vec3, dt: f32) {
        match self.phase {
            Phase::Initializing { next_column } => self.init_step(next_column),
            Phase::Running => self.running_step(observer, dt),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    /// Initial build progress in [0, 1] for an external progress bar.
    pub fn progress(&self) -> f32 {
        match self.phase {
            Phase::Initializing { next_column } => {
                next_column as f32 / self.config.column_count() as f32
            }
            Phase::Running => 1.0,
        }
    }

    /// Observer spawn position, available once the initial build is
    /// complete.
    pub fn spawn_position(&self) -> Option<Vec3> {
        self.spawn
    }

    pub fn chunk(&self, origin: IVec3) -> Option<&ChunkEntry> {
        self.chunks.get(&origin)
    }

    pub fn visible_chunks(&self) -> impl Iterator<Item = &ChunkEntry> {
        self.chunks.values().filter(|entry| entry.active)
    }

    pub fn known_column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn pending_work(&self) -> usize {
        self.queue.len()
    }

    fn init_step(&mut self, next_column: u32) {
        let total = self.config.column_count();
        let width = self.config.world_dimensions.x as u32;
        let x = (next_column % width) as i32 * self.config.chunk_dimensions.x;
        let z = (next_column / width) as i32 * self.config.chunk_dimensions.z;
        self.build_column(x, z);

        let built = next_column + 1;
        let _ = self.events.send(WorldEvent::BuildProgress { built, total });

        if built == total {
            let spawn = self.compute_spawn();
            self.spawn = Some(spawn);
            self.last_observer = spawn;
            self.phase = Phase::Running;
            info!("initial world built: {total} columns, spawn at {spawn:?}");
            let _ = self.events.send(WorldEvent::WorldReady { spawn });
        } else {
            self.phase = Phase::Initializing { next_column: built };
        }
    }

    fn running_step(&mut self, observer: Vec3, dt: f32) {
        self.clock += dt;
        if self.clock >= self.config.update_interval_secs {
            self.clock = 0.0;

            let chunk_width = self.config.chunk_dimensions.x as f32;
            if (observer - self.last_observer).length() > chunk_width {
                self.last_observer = observer;

                let x = (observer.x / chunk_width).round() as i32 * self.config.chunk_dimensions.x;
                let depth = self.config.chunk_dimensions.z as f32;
                let z = (observer.z / depth).round() as i32 * self.config.chunk_dimensions.z;

                debug!("observer crossed a chunk boundary, recentering on ({x}, {z})");
                self.queue.push_back(WorkItem::ExpandRadius {
                    x,
                    z,
                    radius: self.config.column_radius,
                });
                self.queue.push_back(WorkItem::HideDistant { x, z });
            }
        }

        if let Some(item) = self.queue.pop_front() {
            self.run_item(item);
        }
    }

    /// Applies a new terrain layer configuration and schedules every
    /// known column for regeneration through the work queue, one column
    /// per tick. Generation stays pure, so the new meshes depend only
    /// on (origin, new layers).
    pub fn apply_layers(&mut self, layers: TerrainLayers) -> Result<(), LayerError> {
        self.classifier = TerrainClassifier::new(self.config.seed, layers)?;
        self.config.layers = layers;

        let mut known: Vec<ColumnPos> = self.columns.iter().copied().collect();
        known.sort_by_key(|column| (column.x, column.z));
        for column in &known {
            self.queue.push_back(WorkItem::RebuildColumn {
                x: column.x,
                z: column.z,
            });
        }

        info!("terrain layers changed, {} columns scheduled for rebuild", known.len());
        Ok(())
    }

    fn run_item(&mut self, item: WorkItem) {
        match item {
            WorkItem::BuildColumn { x, z } => self.build_column(x, z),
            WorkItem::RebuildColumn { x, z } => self.rebuild_column(x, z),
            WorkItem::ExpandRadius { x, z, radius } => self.expand_radius(x, z, radius),
            WorkItem::HideDistant { x, z } => self.hide_distant(x, z),
        }
    }

    /// One step of the radius-bounded cardinal expansion: schedule the
    /// four neighbouring columns, then the next ring. Rings overlap;
    /// already-known columns resolve as reactivations.
    fn expand_radius(&mut self, x: i32, z: i32, radius: i32) {
        if radius <= 0 {
            return;
        }

        let step_x = self.config.chunk_dimensions.x;
        let step_z = self.config.chunk_dimensions.z;
        let next = radius - 1;

        for (nx, nz) in [
            (x, z + step_z),
            (x, z - step_z),
            (x + step_x, z),
            (x - step_x, z),
        ] {
            self.queue.push_back(WorkItem::BuildColumn { x: nx, z: nz });
            if next > 0 {
                self.queue.push_back(WorkItem::ExpandRadius {
                    x: nx,
                    z: nz,
                    radius: next,
                });
            }
        }
    }

    /// Builds or reactivates the column at a chunk-aligned (x, z).
    /// Building is idempotent: chunks that already exist only get their
    /// active flag restored.
    fn build_column(&mut self, x: i32, z: i32) {
        let column = ColumnPos { x, z };
        let chunk_height = self.config.chunk_dimensions.y;
        let mut newly_built = false;
        let mut reactivated = false;

        for level in 0..self.config.world_dimensions.y {
            let origin = IVec3::new(x, level * chunk_height, z);

            if let Some(entry) = self.chunks.get_mut(&origin) {
                if !entry.active {
                    entry.active = true;
                    reactivated = true;
                }
                continue;
            }

            // The volume is dropped after meshing; generation is pure,
            // so it can always be rebuilt from the origin alone.
            let volume = populate_volume(&self.classifier, origin, self.dims);
            let mesh = build_chunk_mesh(&volume, &self.jobs);
            self.chunks.insert(
                origin,
                ChunkEntry {
                    origin,
                    mesh,
                    active: true,
                },
            );
            newly_built = true;
        }

        self.columns.insert(column);

        if newly_built {
            debug!("built chunk column ({x}, {z})");
            let _ = self.events.send(WorldEvent::ColumnBuilt { column });
        } else if reactivated {
            let _ = self.events.send(WorldEvent::ColumnShown { column });
        }
    }

    /// Regenerates the meshes of an existing column in place after a
    /// configuration change. Activity flags are preserved; meshes are
    /// replaced wholesale. Unknown columns are no-ops.
    fn rebuild_column(&mut self, x: i32, z: i32) {
        let column = ColumnPos { x, z };
        if !self.columns.contains(&column) {
            return;
        }

        let chunk_height = self.config.chunk_dimensions.y;
        for level in 0..self.config.world_dimensions.y {
            let origin = IVec3::new(x, level * chunk_height, z);
            if !self.chunks.contains_key(&origin) {
                continue;
            }

            let volume = populate_volume(&self.classifier, origin, self.dims);
            let mesh = build_chunk_mesh(&volume, &self.jobs);
            if let Some(entry) = self.chunks.get_mut(&origin) {
                entry.mesh = mesh;
            }
        }

        debug!("rebuilt chunk column ({x}, {z})");
        let _ = self.events.send(WorldEvent::ColumnBuilt { column });
    }

    /// Deactivates every known column farther than radius * chunk width
    /// from the given center. Nothing is destroyed; hidden columns keep
    /// their meshes for reactivation.
    fn hide_distant(&mut self, x: i32, z: i32) {
        let center = Vec2::new(x as f32, z as f32);
        let min_distance = (self.config.column_radius * self.config.chunk_dimensions.x) as f32;

        let known: Vec<ColumnPos> = self.columns.iter().copied().collect();
        for column in known {
            let offset = Vec2::new(column.x as f32, column.z as f32) - center;
            if offset.length() >= min_distance {
                self.hide_column(column);
            }
        }
    }

    fn hide_column(&mut self, column: ColumnPos) {
        let chunk_height = self.config.chunk_dimensions.y;
        let mut hidden = false;

        for level in 0..self.config.world_dimensions.y {
            let origin = IVec3::new(column.x, level * chunk_height, column.z);
            if let Some(entry) = self.chunks.get_mut(&origin) {
                if entry.active {
                    entry.active = false;
                    hidden = true;
                }
            }
        }

        if hidden {
            debug!("hid chunk column ({}, {})", column.x, column.z);
            let _ = self.events.send(WorldEvent::ColumnHidden { column });
        }
    }

    /// Spawn directly above the world center, one drop height over the
    /// sampled surface.
    fn compute_spawn(&self) -> Vec3 {
        let x = (self.config.world_dimensions.x * self.config.chunk_dimensions.x) as f32 / 2.0;
        let z = (self.config.world_dimensions.z * self.config.chunk_dimensions.z) as f32 / 2.0;
        let y = self.classifier.surface_height(x, z) + self.config.spawn_drop_height;
        Vec3::new(x, y, z)
    }
}
