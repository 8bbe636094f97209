//! Worker pool for batch exports.
//! Half of the cores are used so an editor or language server stays responsive.

use anyhow::Result;
use tracing::info;

/// Number of batch workers: half the cores, minimum 1.
pub fn worker_count() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Build a local rayon pool whose threads have `stack_size_mb` of stack.
///
/// The traversal recurses once per tree level, so very deep trees need more than
/// the default thread stack.
pub fn build_export_pool(stack_size_mb: usize) -> Result<rayon::ThreadPool> {
    let workers = worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .stack_size(stack_size_mb.max(1) * 1024 * 1024)
        .thread_name(|i| format!("ast-lens-export-{}", i))
        .build()?;

    info!(
        "Initialized export pool: {} workers (system has {} cores), {} MiB stack",
        workers,
        num_cpus::get(),
        stack_size_mb.max(1)
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size_reserves_capacity() {
        let pool = build_export_pool(4).unwrap();
        assert_eq!(pool.current_num_threads(), worker_count());
        assert!(worker_count() >= 1);
        assert!(worker_count() <= num_cpus::get().max(1));
    }

    #[test]
    fn test_pool_runs_work() {
        let pool = build_export_pool(1).unwrap();
        let sum: usize = pool.install(|| {
            use rayon::prelude::*;
            (1..=10usize).into_par_iter().sum()
        });
        assert_eq!(sum, 55);
    }
}
