//! Newline framing over a byte channel

use crate::error::TransportError;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Read-side tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    /// Bytes requested per read
    pub chunk_bytes: usize,
    /// Pause after a read that produced nothing
    pub retry_interval: Duration,
    /// Consecutive empty reads before giving up, 0 for never
    pub max_idle_retries: u32,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            chunk_bytes: 4096,
            retry_interval: Duration::from_millis(200),
            max_idle_retries: 25,
        }
    }
}

/// Blocking line reader that keeps partial lines between calls
pub struct LineReader<R> {
    inner: R,
    settings: LineSettings,
    pending: Vec<u8>,
    chunk: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, settings: LineSettings) -> Self {
        Self {
            inner,
            chunk: vec![0; settings.chunk_bytes.max(1)],
            settings,
            pending: Vec::new(),
        }
    }

    /// Next line without its terminator (`\n` or `\r\n`)
    pub fn read_line(&mut self) -> Result<String, TransportError> {
        let mut idle = 0u32;

        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }

            match self.inner.read(&mut self.chunk) {
                Ok(0) => idle += 1,
                Ok(n) => {
                    trace!(bytes = n, "read chunk");
                    self.pending.extend_from_slice(&self.chunk[..n]);
                    idle = 0;
                    continue;
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    idle += 1
                }
                Err(e) => return Err(e.into()),
            }

            if self.settings.max_idle_retries > 0 && idle >= self.settings.max_idle_retries {
                debug!(retries = idle, pending = self.pending.len(), "channel idle, giving up");
                return Err(TransportError::Closed { retries: idle });
            }
            thread::sleep(self.settings.retry_interval);
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Serialized line writer, shared between threads
pub struct LineWriter {
    inner: Mutex<Box<dyn Write + Send>>,
}

impl LineWriter {
    pub fn new(inner: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Write `text` plus `\n` and flush
    ///
    /// Embedded line breaks become spaces so one call is always one line.
    pub fn write_line(&self, text: &str) -> Result<(), TransportError> {
        let mut line = text.replace(['\r', '\n'], " ");
        line.push('\n');

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.write_all(line.as_bytes())?;
        inner.flush()?;
        Ok(())
    }
}

/// In-memory sink whose clones share one buffer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: std::sync::Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
