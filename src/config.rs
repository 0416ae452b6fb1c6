use crate::error::ConfigError;
use crate::ipc::LineSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "voicekey.toml";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================================
// Speech worker
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    /// Speech recognition program to launch
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments passed to the program
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Bytes requested per read from the worker's stdout
    #[serde(default = "default_read_chunk_bytes")]
    pub read_chunk_bytes: usize,
    /// Pause between reads that returned nothing
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Empty reads in a row before the channel counts as closed (0 = never)
    #[serde(default = "default_max_idle_retries")]
    pub max_idle_retries: u32,
    /// How long the worker gets to exit after its stdin closes
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            read_chunk_bytes: default_read_chunk_bytes(),
            retry_interval_ms: default_retry_interval_ms(),
            max_idle_retries: default_max_idle_retries(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl SpeechConfig {
    pub fn line_settings(&self) -> LineSettings {
        LineSettings {
            chunk_bytes: self.read_chunk_bytes,
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            max_idle_retries: self.max_idle_retries,
        }
    }
}

fn default_program() -> String {
    "speech-service".into()
}
fn default_args() -> Vec<String> {
    vec!["--encoding".into(), "UTF-8".into()]
}
fn default_read_chunk_bytes() -> usize {
    4096
}
fn default_retry_interval_ms() -> u64 {
    200
}
fn default_max_idle_retries() -> u32 {
    25
}
fn default_shutdown_grace_ms() -> u64 {
    2000
}

// ============================================================================
// Executor
// ============================================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Dedicated thread drains the queue (default)
    #[default]
    Worker,
    /// Host tick runs at most one command per frame
    Tick,
}

#[derive(Debug, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Commands that may wait in the execution queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Host loop tick
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Hold time for `tapkey` and for `press` keys without a duration
    #[serde(default = "default_press_ms")]
    pub default_press_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            queue_capacity: default_queue_capacity(),
            tick_interval_ms: default_tick_interval_ms(),
            default_press_ms: default_press_ms(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1000
}
fn default_tick_interval_ms() -> u64 {
    16
}
fn default_press_ms() -> u64 {
    50
}

// ============================================================================
// Window, console, logging
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct WindowConfig {
    /// Target for a bare `switchwindow` (executable or window title)
    #[serde(default)]
    pub default_target: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleOutput {
    #[default]
    Log,
    Stdout,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConsoleConfig {
    /// Where pass-through commands go: "log" or "stdout"
    #[serde(default)]
    pub output: ConsoleOutput,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".into()
}

impl Config {
    /// Load `voicekey.toml` from the working directory, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load an explicit config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(path),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
