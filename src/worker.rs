//! Speech recognition worker process
//!
//! The worker talks over its stdin/stdout. Closing its stdin tells it the host
//! is gone; it is killed if it does not exit within the grace period.

use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Running worker process
pub struct SpeechWorker {
    child: Child,
    grace: Duration,
}

/// Channel ends handed to the transport
pub struct WorkerPipes {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

impl SpeechWorker {
    /// Launch the configured program with piped stdin/stdout
    pub fn spawn(config: &SpeechConfig) -> Result<(Self, WorkerPipes)> {
        info!(program = %config.program, args = ?config.args, "starting speech worker");

        let spawn_error = |source: std::io::Error| Error::WorkerSpawn {
            program: config.program.clone(),
            source,
        };

        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let pipes = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => WorkerPipes { stdin, stdout },
            _ => {
                let _ = child.kill();
                return Err(spawn_error(std::io::Error::other("worker pipes unavailable")));
            }
        };

        info!(pid = child.id(), "speech worker started");
        let worker = Self {
            child,
            grace: Duration::from_millis(config.shutdown_grace_ms),
        };
        Ok((worker, pipes))
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Wait for the worker to exit, killing it after the grace period
    ///
    /// The caller must have dropped the stdin pipe (usually by dropping the
    /// transport) for the worker to notice.
    pub fn shutdown(mut self) {
        let deadline = Instant::now() + self.grace;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    info!(%status, "speech worker exited");
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(20)),
                Ok(None) => break,
                Err(e) => {
                    warn!("failed to poll speech worker: {}", e);
                    break;
                }
            }
        }

        warn!(pid = self.child.id(), "speech worker still running, killing");
        if let Err(e) = self.child.kill() {
            warn!("failed to kill speech worker: {}", e);
        }
        let _ = self.child.wait();
    }
}
