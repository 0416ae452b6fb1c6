//! Execution drivers
//!
//! Classified commands wait in a bounded channel and run one at a time, in
//! arrival order, either on a dedicated thread ([`WorkerDriver`]) or one per
//! host tick ([`TickDriver`]).

use crate::commands::{CommandDispatcher, CommandExecutor, Dispatch, Invocation};
use crate::host::ConsoleSink;
use flume::{Receiver, Sender, TryRecvError, TrySendError};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of offering a command to the execution queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Custom command, queued for execution
    Accepted,
    /// Custom command, dropped because the queue is full or closed
    Rejected,
    /// Not a custom command
    NotCustom,
}

impl Enqueue {
    pub fn is_accepted(self) -> bool {
        self == Enqueue::Accepted
    }
}

/// Producer side of the execution queue
#[derive(Clone)]
pub struct CommandQueue {
    dispatcher: CommandDispatcher,
    tx: Sender<Invocation>,
}

/// Create a queue holding at most `capacity` pending commands
pub fn command_queue(dispatcher: CommandDispatcher, capacity: usize) -> (CommandQueue, Receiver<Invocation>) {
    let (tx, rx) = flume::bounded(capacity);
    (CommandQueue { dispatcher, tx }, rx)
}

impl CommandQueue {
    /// Queue `raw` if it is a custom command; never blocks
    pub fn enqueue_if_custom(&self, raw: &str) -> Enqueue {
        let invocation = match self.dispatcher.dispatch(raw) {
            Dispatch::Handled(invocation) => invocation,
            Dispatch::NotCustom => return Enqueue::NotCustom,
        };

        match self.tx.try_send(invocation) {
            Ok(()) => {
                debug!(command = raw, "queued for execution");
                Enqueue::Accepted
            }
            Err(TrySendError::Full(_)) => {
                warn!(command = raw, "execution queue full, dropping command");
                Enqueue::Rejected
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(command = raw, "executor gone, dropping command");
                Enqueue::Rejected
            }
        }
    }

    /// Queue custom commands, hand everything else to the console
    pub fn route(&self, raw: &str, console: &dyn ConsoleSink) -> Enqueue {
        let outcome = self.enqueue_if_custom(raw);
        if outcome == Enqueue::NotCustom {
            console.submit(raw);
        }
        outcome
    }
}

/// Runs queued commands on a dedicated thread
pub struct WorkerDriver {
    handle: JoinHandle<()>,
}

impl WorkerDriver {
    /// Start the executor thread
    ///
    /// The executor is built on the new thread, so its input backend never
    /// has to cross threads. The loop ends when `running` clears or every
    /// [`CommandQueue`] is dropped; anything still queued is discarded.
    pub fn spawn<F>(rx: Receiver<Invocation>, running: Arc<AtomicBool>, make_executor: F) -> io::Result<Self>
    where
        F: FnOnce() -> CommandExecutor + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("command-executor".to_string())
            .spawn(move || {
                let mut executor = make_executor();
                info!("command executor started");

                while running.load(Ordering::SeqCst) {
                    match rx.recv_timeout(Duration::from_millis(100)) {
                        Ok(invocation) => executor.execute(&invocation),
                        Err(flume::RecvTimeoutError::Timeout) => continue,
                        Err(flume::RecvTimeoutError::Disconnected) => break,
                    }
                }

                let discarded = rx.drain().count();
                if discarded > 0 {
                    info!(discarded, "discarding queued commands at shutdown");
                }
                info!("command executor stopped");
            })?;

        Ok(Self { handle })
    }

    pub fn join(self) {
        if self.handle.join().is_err() {
            warn!("command executor panicked");
        }
    }
}

/// Runs at most one queued command per host tick, on the caller's thread
pub struct TickDriver {
    rx: Receiver<Invocation>,
    executor: CommandExecutor,
}

impl TickDriver {
    pub fn new(rx: Receiver<Invocation>, executor: CommandExecutor) -> Self {
        Self { rx, executor }
    }

    /// Execute the oldest queued command, if any; returns whether one ran
    ///
    /// Blocks the caller for the whole command, delays included.
    pub fn drain_one(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(invocation) => {
                self.executor.execute(&invocation);
                true
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => false,
        }
    }

    /// Commands still waiting
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
