//! Per-station min/mean/max over large `<station>;<reading>` files.
//!
//! The input is cut into newline-aligned chunks, every chunk is folded into a
//! private [`StationTable`] on its own worker, and the partial tables are
//! merged into one before being rendered as a sorted summary.

use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Instant;

use tracing::info;

pub mod config;
pub mod error;
pub mod map;
pub mod mmap;
pub mod parser;
pub mod report;
pub mod stream;
pub mod temperature;

pub use config::{Backend, Config, Strategy};
pub use error::{Error, Result};
pub use map::StationTable;
pub use temperature::{Reading, Temperature};

/// Work done by one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub chunks: usize,
    pub bytes: u64,
}

/// Aggregates `path` with the default configuration and writes the summary to `sink`.
pub fn run<P: AsRef<Path>, W: Write>(path: P, sink: &mut W) -> Result<()> {
    run_with(&Config::default(), path, sink).map(|_| ())
}

pub fn run_with<P: AsRef<Path>, W: Write>(config: &Config, path: P, sink: &mut W) -> Result<RunStats> {
    match config.backend {
        Backend::FixedPoint => execute::<i64, W>(config, path.as_ref(), sink),
        Backend::Float => execute::<f64, W>(config, path.as_ref(), sink),
    }
}

fn execute<R: Reading, W: Write>(config: &Config, path: &Path, sink: &mut W) -> Result<RunStats> {
    let start = Instant::now();
    info!(
        path = %path.display(),
        backend = %config.backend,
        strategy = %config.strategy,
        window = config.window_size,
        workers = config.workers,
        "aggregating"
    );

    let (results, stats) = aggregate::<R>(config, path)?;
    report::write_results(&results, sink)?;

    info!(
        stations = results.len(),
        chunks = stats.chunks,
        bytes = stats.bytes,
        elapsed = ?start.elapsed(),
        "finished"
    );
    Ok(stats)
}

/// Builds the merged table for `path` without rendering it.
///
/// The stream strategy runs on a runtime of its own. When called from a
/// thread that already drives a tokio runtime, that runtime is built, driven
/// and dropped on a scoped thread instead.
pub fn aggregate<R: Reading>(config: &Config, path: &Path) -> Result<(StationTable<R>, RunStats)> {
    match config.strategy {
        Strategy::Stream if tokio::runtime::Handle::try_current().is_ok() => {
            thread::scope(|scope| {
                scope
                    .spawn(|| aggregate_stream::<R>(config, path))
                    .join()
                    .map_err(|_| Error::Runtime("stream aggregation thread panicked".to_string()))?
            })
        }
        Strategy::Stream => aggregate_stream::<R>(config, path),
        Strategy::Mapped => mmap::with_mmap::<R>(path, config),
    }
}

fn aggregate_stream<R: Reading>(config: &Config, path: &Path) -> Result<(StationTable<R>, RunStats)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers.min(2))
        .max_blocking_threads(config.workers + 2)
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;
    runtime.block_on(stream::with_decoder::<R>(path, config))
}
