use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Batch progress tracking shared by the workers
pub struct BatchProcessor {
    pub total_files: usize,
    pub processed_count: AtomicUsize,
    pub start_time: Instant,
}

impl BatchProcessor {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            processed_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Increment processed count and return current count
    pub fn increment(&self) -> usize {
        self.processed_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Option<Duration> {
        let processed = self.processed_count.load(Ordering::Relaxed);
        if processed == 0 {
            return None;
        }

        let remaining = self.total_files.saturating_sub(processed);
        if remaining == 0 {
            return Some(Duration::ZERO);
        }

        let time_per_item = self.start_time.elapsed() / processed as u32;
        Some(time_per_item * remaining as u32)
    }
}

/// Progress snapshot handed to the completion callback
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub eta: Option<Duration>,
}

/// Run `process_fn` over every file, one at a time when `jobs <= 1`,
/// otherwise on a dedicated rayon pool of `jobs` threads.
///
/// Results keep the order of `files`. `on_complete` is called right after each
/// file finishes, from whichever worker processed it.
pub fn process_files<T, F, P>(
    files: &[PathBuf],
    jobs: usize,
    process_fn: F,
    on_complete: P,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Path) -> T + Send + Sync,
    P: Fn(&T, BatchProgress) + Send + Sync,
{
    let processor = BatchProcessor::new(files.len());

    let run_one = |file_path: &PathBuf| {
        let result = process_fn(file_path.as_path());

        let completed = processor.increment();
        on_complete(
            &result,
            BatchProgress {
                completed,
                total: processor.total_files,
                eta: processor.eta(),
            },
        );

        result
    };

    if jobs <= 1 || files.len() <= 1 {
        return Ok(files.iter().map(run_one).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to initialize thread pool")?;

    Ok(pool.install(|| files.par_iter().map(run_one).collect()))
}
