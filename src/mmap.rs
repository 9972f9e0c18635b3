use std::{fs::File, ops::Range, path::Path};

use memmap2::Mmap;
use rayon::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::map::StationTable;
use crate::parser::parser;
use crate::temperature::Reading;
use crate::RunStats;

/// Cuts `data` into at most `parts` ranges, each ending just after a line break
/// (or at the end of `data`).
pub fn split_ranges(data: &[u8], parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk_length = (data.len() / parts).max(1);

    let mut chunks = Vec::with_capacity(parts);
    let mut start = 0;
    while start < data.len() {
        let target = start + chunk_length;
        let end = if chunks.len() + 1 == parts || target >= data.len() {
            data.len()
        } else {
            match memchr::memchr(b'\n', &data[target..]) {
                Some(extra) => target + extra + 1,
                None => data.len(),
            }
        };
        chunks.push(start..end);
        start = end;
    }
    chunks
}

/// Folds `data` as `parts` chunks on the current rayon pool.
pub fn aggregate_slice<R: Reading>(data: &[u8], parts: usize) -> Result<StationTable<R>> {
    fold_ranges(data, split_ranges(data, parts))
}

fn fold_ranges<R: Reading>(data: &[u8], ranges: Vec<Range<usize>>) -> Result<StationTable<R>> {
    ranges
        .into_par_iter()
        .map(|range| parser::<R>(&data[range]))
        .try_reduce(StationTable::new, |mut results, result| {
            results.merge(result);
            Ok(results)
        })
}

pub fn with_mmap<R: Reading>(path: &Path, config: &Config) -> Result<(StationTable<R>, RunStats)> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let length = file.metadata()?.len();
    if length == 0 {
        return Ok((StationTable::new(), RunStats::default()));
    }

    // The mapping is only read, and only for the lifetime of this call.
    let map = unsafe { Mmap::map(&file)? };
    #[cfg(unix)]
    map.advise(memmap2::Advice::Sequential)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;
    debug!(threads = config.workers, bytes = length, "mapped input");

    let ranges = split_ranges(&map, config.workers);
    let stats = RunStats {
        chunks: ranges.len(),
        bytes: length,
    };
    let results = pool.install(|| fold_ranges::<R>(&map, ranges))?;
    Ok((results, stats))
}
