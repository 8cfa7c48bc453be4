//! Execution of the parallel fine sweep.
//!
//! The fine sweep is the only step of a Parareal iteration without inter-slice
//! dependencies. Executors apply one closure to every slice and return once all of
//! them have finished, which is the synchronization point before the sequential
//! correction sweep. Each closure invocation owns exactly one slice mutably, so no
//! slice is written by two tasks.

use crate::error::PararealError;

#[cfg(feature = "rayon")]
pub mod rayon_pool;
#[cfg(feature = "rayon")]
pub use rayon_pool::RayonExecutor;

/// Applies a fallible closure to every item of a slice.
pub trait Executor {
    /// Number of workers.
    fn size(&self) -> usize;

    /// Run `f` on every item; returns after all items are done. The first error
    /// is reported, and items still pending may be skipped.
    fn for_each_mut<T, F>(&self, items: &mut [T], f: F) -> Result<(), PararealError>
    where
        T: Send,
        F: Fn(&mut T) -> Result<(), PararealError> + Send + Sync;
}

/// In-order execution on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn size(&self) -> usize {
        1
    }

    fn for_each_mut<T, F>(&self, items: &mut [T], f: F) -> Result<(), PararealError>
    where
        T: Send,
        F: Fn(&mut T) -> Result<(), PararealError> + Send + Sync,
    {
        items.iter_mut().try_for_each(f)
    }
}

/// Executor chosen at run time.
#[derive(Debug)]
pub enum SweepExecutor {
    Serial(SerialExecutor),
    #[cfg(feature = "rayon")]
    Rayon(RayonExecutor),
}

impl SweepExecutor {
    /// One thread means serial; otherwise a dedicated rayon pool (when the feature is
    /// enabled) with `threads` workers, defaulting to one per core.
    pub fn from_threads(threads: Option<usize>) -> Result<Self, PararealError> {
        match threads {
            Some(0) => Err(PararealError::config("thread count must be at least 1")),
            Some(1) => Ok(SweepExecutor::Serial(SerialExecutor)),
            #[cfg(feature = "rayon")]
            _ => Ok(SweepExecutor::Rayon(RayonExecutor::new(threads)?)),
            #[cfg(not(feature = "rayon"))]
            _ => Ok(SweepExecutor::Serial(SerialExecutor)),
        }
    }
}

impl Default for SweepExecutor {
    fn default() -> Self {
        SweepExecutor::Serial(SerialExecutor)
    }
}

impl Executor for SweepExecutor {
    fn size(&self) -> usize {
        match self {
            SweepExecutor::Serial(exec) => exec.size(),
            #[cfg(feature = "rayon")]
            SweepExecutor::Rayon(exec) => exec.size(),
        }
    }

    fn for_each_mut<T, F>(&self, items: &mut [T], f: F) -> Result<(), PararealError>
    where
        T: Send,
        F: Fn(&mut T) -> Result<(), PararealError> + Send + Sync,
    {
        match self {
            SweepExecutor::Serial(exec) => exec.for_each_mut(items, f),
            #[cfg(feature = "rayon")]
            SweepExecutor::Rayon(exec) => exec.for_each_mut(items, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_visits_every_item() {
        let mut items = vec![1, 2, 3];
        SerialExecutor.for_each_mut(&mut items, |x| {
            *x *= 10;
            Ok(())
        })
        .unwrap();
        assert_eq!(items, vec![10, 20, 30]);
    }

    #[test]
    fn errors_propagate() {
        let exec = SweepExecutor::from_threads(Some(2)).unwrap();
        let mut items = vec![0usize; 8];
        let err = exec
            .for_each_mut(&mut items, |_| Err(PararealError::config("boom")))
            .unwrap_err();
        assert_eq!(err, PararealError::Configuration("boom".into()));
    }

    #[test]
    fn zero_threads_rejected() {
        assert!(SweepExecutor::from_threads(Some(0)).is_err());
        assert_eq!(SweepExecutor::from_threads(Some(1)).unwrap().size(), 1);
    }
}
