use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

/// Shared worker pool for the data-parallel phases of chunk meshing.
///
/// The pool is owned by the application and borrowed wherever parallel
/// work is dispatched, so thread count is decided exactly once.
pub struct JobSystem {
    pool: ThreadPool,
}

impl JobSystem {
    pub fn new(num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|index| format!("chunk-worker-{index}"));
        if let Some(count) = num_threads {
            builder = builder.num_threads(count);
        }

        let pool = builder.build()?;
        debug!("job system started with {} worker threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    /// Runs `op` on the pool and blocks until every task spawned inside
    /// the scope has finished. The chunk buffer fill relies on this
    /// join: the caller must not observe a partially-written mesh.
    pub fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R + Send,
        R: Send,
    {
        self.pool.scope(op)
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Default for JobSystem {
    fn default() -> Self {
        Self::new(None).expect("failed to create default worker pool")
    }
}
