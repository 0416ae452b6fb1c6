//! Voice command execution
//!
//! A speech recognition worker sends text commands over a line-framed pipe.
//! The host classifies each one: custom commands (`press`, `tapkey`,
//! `holdkey`, `releasekey`, `sleep`, `switchwindow`) are queued and executed
//! as timed synthetic input; anything else goes to the host console.
//!
//! ```text
//! worker stdout -> ResponseReader -> Inbox -> HostSession::tick
//!     -> CommandQueue (custom) -> WorkerDriver / TickDriver -> CommandExecutor
//!     -> ConsoleSink (pass-through)
//! ```

pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod host;
pub mod input;
pub mod ipc;
pub mod session;
pub mod worker;

pub use error::{Error, Result};
