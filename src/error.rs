//! Error types for the fallible edges of the pipeline
//!
//! The command path itself never fails: bad tokens, unknown actions and
//! unrecognized lines all degrade to no-ops. Errors only exist where the crate
//! touches the outside world (config files, the worker process, the OS input
//! facility, window focus, the byte channel).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-level result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the composition root
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error(transparent)]
    Focus(#[from] FocusError),

    #[error("failed to start speech worker `{program}`: {source}")]
    WorkerSpawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Failures loading `voicekey.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures on the line-framed byte channel
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer stopped producing data for longer than the idle budget
    #[error("channel closed after {retries} empty reads")]
    Closed { retries: u32 },

    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures from the synthetic input backend
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("input backend unavailable: {0}")]
    Unavailable(String),

    #[error("no platform key code for scan code {0}")]
    Unmapped(u32),

    #[error("input backend rejected event: {0}")]
    Rejected(String),
}

/// Failures bringing a window to the foreground
#[derive(Debug, Error)]
pub enum FocusError {
    #[error("no window matches `{0}`")]
    NotFound(String),

    #[error("focus helper failed: {0}")]
    Helper(#[from] io::Error),
}
