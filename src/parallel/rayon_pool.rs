// rayon-based fine sweep

use rayon::prelude::*;

use super::Executor;
use crate::error::PararealError;

/// Owns a dedicated rayon pool so concurrent runs do not share workers.
#[derive(Debug)]
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    pub fn new(threads: Option<usize>) -> Result<Self, PararealError> {
        let n = threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| PararealError::config(format!("failed to build thread pool: {e}")))?;
        Ok(RayonExecutor { pool })
    }
}

impl Executor for RayonExecutor {
    fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn for_each_mut<T, F>(&self, items: &mut [T], f: F) -> Result<(), PararealError>
    where
        T: Send,
        F: Fn(&mut T) -> Result<(), PararealError> + Send + Sync,
    {
        self.pool
            .install(|| items.par_iter_mut().try_for_each(|item| f(item)))
    }
}
