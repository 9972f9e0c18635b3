use std::path::Path;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tokio::{
    fs::File,
    sync::{mpsc, Semaphore},
    task::{self, JoinSet},
};
use tokio_stream::StreamExt;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::map::StationTable;
use crate::parser::parser;
use crate::temperature::Reading;
use crate::RunStats;

/// Cuts the input into chunks of whole lines, one per read window.
///
/// Bytes after the last line break of a window stay in the read buffer and
/// become the head of the next chunk.
pub struct ChunkDecoder {
    window: usize,
}

impl ChunkDecoder {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Decoder for ChunkDecoder {
    type Item = Bytes;
    type Error = Error;

    #[inline]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < self.window {
            return Ok(None);
        }
        match memchr::memrchr(b'\n', &src[..self.window]) {
            Some(index) => {
                let chunk = src.split_to(index);
                src.advance(1);
                Ok(Some(chunk.freeze()))
            }
            None => Err(Error::LineTooLong {
                window: self.window,
            }),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(chunk) = self.decode(src)? {
            return Ok(Some(chunk));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let mut chunk = src.split();
        if chunk.last() == Some(&b'\n') {
            chunk.truncate(chunk.len() - 1);
        }
        Ok(Some(chunk.freeze()))
    }
}

/// Reads `path` window by window and folds every chunk on the blocking pool.
///
/// At most `config.max_in_flight` chunks are held by workers at once. Each
/// worker hands its table to a single merging task over a channel, and the
/// number of merged tables must match the number of dispatched chunks.
pub async fn with_decoder<R: Reading>(
    path: &Path,
    config: &Config,
) -> Result<(StationTable<R>, RunStats)> {
    let file = File::open(path).await.map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut chunks = FramedRead::with_capacity(
        file,
        ChunkDecoder::new(config.window_size),
        config.window_size,
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<StationTable<R>>();
    let merger = task::spawn_blocking(move || {
        let mut results = StationTable::new();
        let mut merged = 0usize;
        while let Some(result) = rx.blocking_recv() {
            results.merge(result);
            merged += 1;
        }
        (results, merged)
    });

    let limiter = Arc::new(Semaphore::new(config.max_in_flight));
    let mut workers = JoinSet::new();
    let mut stats = RunStats::default();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let permit = limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::WorkerDisconnected)?;
        stats.chunks += 1;
        stats.bytes += chunk.len() as u64;
        trace!(chunk = stats.chunks, bytes = chunk.len(), "dispatching chunk");

        let tx = tx.clone();
        workers.spawn_blocking(move || {
            let _permit = permit;
            let table = parser::<R>(&chunk)?;
            tx.send(table).map_err(|_| Error::WorkerDisconnected)
        });

        while let Some(joined) = workers.try_join_next() {
            joined??;
        }
    }
    drop(tx);

    while let Some(joined) = workers.join_next().await {
        joined??;
    }
    let (results, merged) = merger.await?;
    debug!(dispatched = stats.chunks, merged, "joined chunk workers");
    if merged != stats.chunks {
        return Err(Error::ChunkCountMismatch {
            dispatched: stats.chunks,
            merged,
        });
    }

    Ok((results, stats))
}
