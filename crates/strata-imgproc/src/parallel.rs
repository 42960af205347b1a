use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride does not split the buffer into whole rows.
    #[error("row stride {0} does not divide a buffer of {1} elements")]
    InvalidRowStride(usize, usize),
}

/// A half-open range of rows `[start, end)` owned by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRange {
    /// First row of the range.
    pub start: usize,
    /// One past the last row of the range.
    pub end: usize,
}

impl WorkRange {
    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range holds no rows, in which case its worker stays idle.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Iterate over the rows of the range.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Split `extent` rows into `workers` contiguous, disjoint ranges.
///
/// Every worker gets `extent / workers` rows and the last one also takes the
/// remainder. When there are more workers than rows the leading ranges are
/// empty.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidThreadCount`] if `workers` is zero.
///
/// # Examples
///
/// ```
/// use strata_imgproc::parallel::{partition, WorkRange};
///
/// let ranges = partition(10, 3).unwrap();
/// assert_eq!(ranges, vec![
///     WorkRange { start: 0, end: 3 },
///     WorkRange { start: 3, end: 6 },
///     WorkRange { start: 6, end: 10 },
/// ]);
/// ```
pub fn partition(extent: usize, workers: usize) -> Result<Vec<WorkRange>, ParallelError> {
    if workers == 0 {
        return Err(ParallelError::InvalidThreadCount(workers));
    }

    let rows_per_worker = extent / workers;

    let ranges = (0..workers)
        .map(|worker_id| {
            let start = worker_id * rows_per_worker;
            let end = if worker_id == workers - 1 {
                extent
            } else {
                start + rows_per_worker
            };
            WorkRange { start, end }
        })
        .collect();

    Ok(ranges)
}

/// A fixed set of worker threads reused by every pass of one filter call.
///
/// A single worker runs on the calling thread and never builds a pool.
pub struct WorkerPool {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Create a pool of `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidThreadCount`] if `workers` is zero, or
    /// [`ParallelError::BuildError`] if the threads can not be spawned.
    pub fn new(workers: usize) -> Result<Self, ParallelError> {
        if workers == 0 {
            return Err(ParallelError::InvalidThreadCount(workers));
        }

        let pool = if workers == 1 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            Some(pool)
        };

        Ok(Self { workers, pool })
    }

    /// Number of workers rows are split across.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Run `f` over the rows of `dst`, split across the workers of `pool`.
///
/// `dst` is cut into one slice per [`WorkRange`] returned by [`partition`], so
/// each worker gets exclusive write access to the rows it owns and nothing
/// else. The call returns once every worker has finished.
///
/// # Arguments
///
/// * `pool` - The workers to run on.
/// * `dst` - The destination buffer, `rows * row_stride` elements long.
/// * `row_stride` - Number of elements in one row.
/// * `f` - Called with the range of rows and the matching slice of `dst`.
pub fn par_rows<T, F>(
    pool: &WorkerPool,
    dst: &mut [T],
    row_stride: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(WorkRange, &mut [T]) + Sync,
{
    if dst.is_empty() {
        return Ok(());
    }

    if row_stride == 0 || dst.len() % row_stride != 0 {
        return Err(ParallelError::InvalidRowStride(row_stride, dst.len()));
    }

    let num_rows = dst.len() / row_stride;
    let ranges = partition(num_rows, pool.workers)?;

    let Some(thread_pool) = &pool.pool else {
        f(ranges[0], dst);
        return Ok(());
    };

    log::trace!("dispatching {} rows over {} workers", num_rows, pool.workers);

    let mut chunks = Vec::with_capacity(ranges.len());
    let mut rest = dst;
    for range in ranges {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * row_stride);
        chunks.push((range, head));
        rest = tail;
    }

    let f = &f;
    thread_pool.scope(|s| {
        for (range, chunk) in chunks {
            if range.is_empty() {
                continue;
            }
            s.spawn(move |_| f(range, chunk));
        }
    });

    Ok(())
}
