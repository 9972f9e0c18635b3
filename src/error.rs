use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No line break found within a {window} byte read window")]
    LineTooLong { window: usize },

    #[error("Record without a ';' separator: {line:?}")]
    MalformedRecord { line: String },

    #[error("Empty station name")]
    EmptyStationName,

    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Worker result channel closed before all chunks were merged")]
    WorkerDisconnected,

    #[error("Dispatched {dispatched} chunks but merged {merged}")]
    ChunkCountMismatch { dispatched: usize, merged: usize },

    #[error("Unable to start runtime: {0}")]
    Runtime(String),
}
