use std::fmt;
use std::str::FromStr;

/// Default size of one read window, and so of one chunk.
pub const DEFAULT_WINDOW_SIZE: usize = 4 * 1024 * 1024;

/// Numeric representation used while accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Readings scaled to tenths in an `i64`.
    #[default]
    FixedPoint,
    Float,
}

/// How the input file is split and handed to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Windowed reads, one blocking task per chunk.
    #[default]
    Stream,
    /// Memory mapped file cut into one slice per worker thread.
    Mapped,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "int" | "fixed" | "fixed-point" => Ok(Self::FixedPoint),
            "float" => Ok(Self::Float),
            other => Err(format!("unknown backend '{other}', expected 'fixed' or 'float'")),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stream" => Ok(Self::Stream),
            "mmap" | "mapped" => Ok(Self::Mapped),
            other => Err(format!("unknown strategy '{other}', expected 'stream' or 'mmap'")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedPoint => write!(f, "fixed"),
            Self::Float => write!(f, "float"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Mapped => write!(f, "mmap"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub window_size: usize,
    pub workers: usize,
    pub max_in_flight: usize,
    pub backend: Backend,
    pub strategy: Strategy,
}

impl Config {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let workers = num_cpus::get();
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            workers,
            max_in_flight: workers * 2,
            backend: Backend::default(),
            strategy: Strategy::default(),
        }
    }
}
